//! Replay a recorded session.

use std::path::PathBuf;

use tracing::warn;

use handsign_common::config::AppConfig;
use handsign_engine::session::Session;
use handsign_model::action::ActionSet;
use handsign_model::event::{parse_events, parse_header};

pub fn run(config: &AppConfig, session: PathBuf, actions: PathBuf, json: bool) -> anyhow::Result<()> {
    let actions =
        ActionSet::load(&actions).map_err(|e| anyhow::anyhow!("Failed to load actions: {e}"))?;
    let content = std::fs::read_to_string(&session)
        .map_err(|e| anyhow::anyhow!("Failed to read session {}: {e}", session.display()))?;

    let header = parse_header(&content)?;
    let events = parse_events(&content)?;

    if let Some(header) = &header {
        if header.tick_rate_hz != config.tick_rate_hz {
            warn!(
                recorded = header.tick_rate_hz,
                configured = config.tick_rate_hz,
                "Session was recorded at a different tick rate"
            );
        }
    }

    let mut replayer = Session::from_config(config, &actions)?;
    let report = replayer.replay(&events)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Session: {}", session.display());
    if let Some(header) = &header {
        println!("  Recorded: {} @ {} Hz", header.epoch_wall, header.tick_rate_hz);
        if let Some(description) = &header.description {
            println!("  Description: {description}");
        }
    }
    println!("  Events: {}", report.events);
    println!("  Ticks: {}", report.ticks);
    println!(
        "  Duration: {:.3}s",
        handsign_common::clock::ns_to_secs(report.duration_ns)
    );
    println!("  Gestures raised: {}", report.gestures);
    println!();

    let excluded = replayer.dispatcher().excluded();
    if !excluded.is_empty() {
        println!("Excluded actions (no templates): {}", excluded.join(", "));
        println!();
    }

    if report.performed.is_empty() {
        println!("No actions performed.");
        return Ok(());
    }

    println!("Performed actions:");
    for performed in &report.performed {
        println!(
            "  {:>9.3}s  {:<16} {:<5} palm={} motion={}",
            handsign_common::clock::ns_to_secs(performed.timestamp_ns),
            performed.action,
            performed.gesture.hand,
            performed.gesture.palm_orientations,
            performed.gesture.motion_orientations,
        );
    }

    Ok(())
}
