//! Serializable action definitions.
//!
//! An action file is a JSON document listing named actions, each with the
//! templates that trigger it and, for two-handed actions, the combo window.

use std::path::Path;

use serde::{Deserialize, Serialize};

use handsign_common::error::{HandsignError, HandsignResult};

use crate::gesture::GestureTemplate;
use crate::hand::HandFlags;

/// One named action and its trigger patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,

    /// Whether the action needs one gesture from each hand.
    #[serde(default)]
    pub dual: bool,

    /// Combo window override in seconds; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_secs: Option<f64>,

    #[serde(default)]
    pub templates: Vec<GestureTemplate>,
}

/// A collection of action definitions, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSet {
    pub actions: Vec<ActionDefinition>,
}

impl ActionDefinition {
    pub fn single(name: impl Into<String>, templates: Vec<GestureTemplate>) -> Self {
        Self {
            name: name.into(),
            dual: false,
            window_secs: None,
            templates,
        }
    }

    pub fn dual(name: impl Into<String>, templates: Vec<GestureTemplate>) -> Self {
        Self {
            dual: true,
            ..Self::single(name, templates)
        }
    }

    pub fn with_window(mut self, window_secs: f64) -> Self {
        self.window_secs = Some(window_secs);
        self
    }
}

impl ActionSet {
    pub fn from_json(json: &str) -> HandsignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load an action file from disk.
    pub fn load(path: &Path) -> HandsignResult<Self> {
        if !path.exists() {
            return Err(HandsignError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> HandsignResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Describe every definition problem found. An empty list means the set is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (index, action) in self.actions.iter().enumerate() {
            if action.name.trim().is_empty() {
                issues.push(format!("action #{index} has no name"));
            }
            if self.actions[..index].iter().any(|a| a.name == action.name) {
                issues.push(format!("action '{}' is defined more than once", action.name));
            }
            if action.templates.is_empty() {
                issues.push(format!(
                    "action '{}' has no templates and will be excluded from dispatch",
                    action.name
                ));
            }
            for (t, template) in action.templates.iter().enumerate() {
                if template.required_hand == HandFlags::Both {
                    issues.push(format!(
                        "action '{}' template #{t} requires hand 'both' but gestures come from one hand, so it can never match",
                        action.name
                    ));
                } else if !template.is_satisfiable() {
                    issues.push(format!(
                        "action '{}' template #{t} has an empty orientation set and can never match",
                        action.name
                    ));
                }
            }
            if let Some(window) = action.window_secs {
                if !action.dual {
                    issues.push(format!(
                        "action '{}' sets window_secs but is not dual",
                        action.name
                    ));
                }
                if !(window.is_finite() && window > 0.0) {
                    issues.push(format!(
                        "action '{}' has a non-positive combo window ({window})",
                        action.name
                    ));
                }
            }
        }

        issues
    }
}
