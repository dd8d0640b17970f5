//! Handsign Common Utilities
//!
//! Shared infrastructure for all Handsign crates:
//! - Error types and result aliases
//! - Fixed-rate tick clock and time conversions
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
