//! Validate an action definition file.

use std::path::PathBuf;

use handsign_common::config::AppConfig;
use handsign_model::action::ActionSet;

pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    println!("Validating actions at: {}", path.display());

    let actions =
        ActionSet::load(&path).map_err(|e| anyhow::anyhow!("Failed to load actions: {e}"))?;

    for action in &actions.actions {
        let kind = if action.dual {
            let window = action.window_secs.unwrap_or(config.combo.window_secs);
            format!("dual, {window:.2}s window")
        } else {
            "single".to_string()
        };
        println!(
            "  {} ({kind}): {} template(s)",
            action.name,
            action.templates.len()
        );
    }

    let mut issues = actions.validate();
    if let Err(e) = config.validate() {
        issues.push(format!("configuration: {e}"));
    }

    if issues.is_empty() {
        println!("\nActions are valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!("\n{} issue(s) found.", issues.len());
    }

    Ok(())
}
