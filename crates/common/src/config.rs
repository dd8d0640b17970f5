//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{HandsignError, HandsignResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fixed simulation rate the recognizer is ticked at (Hz).
    pub tick_rate_hz: u32,

    /// Gesture recognition settings.
    pub recognition: RecognitionSettings,

    /// Dual-hand combo settings.
    pub combo: ComboSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// How the assembler treats a hand that stays past the motion threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionMode {
    /// Raise a gesture on every tick while the hand is past the threshold.
    #[default]
    EveryTick,
    /// Raise one gesture per threshold crossing.
    OncePerCrossing,
}

/// Gesture recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Distance the hand must travel from its engage point before a motion registers.
    pub distance_threshold: f64,

    /// Angles strictly below this (degrees) map to the "toward" label of a pair.
    pub low_angle_deg: f64,

    /// Angles strictly above this (degrees) map to the "away" label of a pair.
    pub high_angle_deg: f64,

    pub left_hand_enabled: bool,
    pub right_hand_enabled: bool,

    pub emission: EmissionMode,
}

/// Dual-hand combo settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboSettings {
    /// Default window between the first and second hand of a combo (seconds).
    pub window_secs: f64,

    /// Clear both hands as soon as a combo completes instead of waiting for expiry.
    pub reset_on_complete: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "handsign_engine=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 50,
            recognition: RecognitionSettings::default(),
            combo: ComboSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            distance_threshold: 0.3,
            low_angle_deg: 45.0,
            high_angle_deg: 135.0,
            left_hand_enabled: true,
            right_hand_enabled: true,
            emission: EmissionMode::EveryTick,
        }
    }
}

impl Default for ComboSettings {
    fn default() -> Self {
        Self {
            window_secs: 1.0,
            reset_on_complete: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl RecognitionSettings {
    /// Check thresholds for values the classifier cannot work with.
    pub fn validate(&self) -> HandsignResult<()> {
        if !(self.distance_threshold.is_finite() && self.distance_threshold > 0.0) {
            return Err(HandsignError::config(format!(
                "distance_threshold must be positive, got {}",
                self.distance_threshold
            )));
        }
        if !(0.0..=180.0).contains(&self.low_angle_deg)
            || !(0.0..=180.0).contains(&self.high_angle_deg)
        {
            return Err(HandsignError::config(format!(
                "angle thresholds must lie in [0, 180], got {}/{}",
                self.low_angle_deg, self.high_angle_deg
            )));
        }
        if self.low_angle_deg >= self.high_angle_deg {
            return Err(HandsignError::config(format!(
                "low_angle_deg ({}) must be below high_angle_deg ({})",
                self.low_angle_deg, self.high_angle_deg
            )));
        }
        Ok(())
    }
}

impl ComboSettings {
    pub fn validate(&self) -> HandsignResult<()> {
        if !(self.window_secs.is_finite() && self.window_secs > 0.0) {
            return Err(HandsignError::config(format!(
                "combo window must be positive, got {}",
                self.window_secs
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Validate every section; the first problem found is returned.
    pub fn validate(&self) -> HandsignResult<()> {
        if self.tick_rate_hz == 0 {
            return Err(HandsignError::config("tick_rate_hz must be non-zero"));
        }
        self.recognition.validate()?;
        self.combo.validate()
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("handsign").join("config.json")
}
