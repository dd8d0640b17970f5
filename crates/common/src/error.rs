//! Error types shared across Handsign crates.

use std::path::PathBuf;

/// Top-level error type for Handsign operations.
#[derive(Debug, thiserror::Error)]
pub enum HandsignError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A collaborator the engine needs (reference frame, hand pose) was absent.
    #[error("Missing collaborator: {message}")]
    MissingCollaborator { message: String },

    #[error("Tracking error: {message}")]
    Tracking { message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using HandsignError.
pub type HandsignResult<T> = Result<T, HandsignError>;

impl HandsignError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn missing_collaborator(msg: impl Into<String>) -> Self {
        Self::MissingCollaborator {
            message: msg.into(),
        }
    }

    pub fn tracking(msg: impl Into<String>) -> Self {
        Self::Tracking {
            message: msg.into(),
        }
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }
}
