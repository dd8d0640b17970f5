//! Handsign Recognition
//!
//! Turns hand-tracking samples into gesture events:
//! - **Classifier:** bucket the angle between two directions into a label
//! - **Pose sampling:** static palm orientation of a hand
//! - **Motion tracking:** displacement since engagement, classified by direction
//! - **Assembly:** per-tick polling of both hands into [`Gesture`] events
//!
//! This crate is pure computation driven by the caller's tick; it performs
//! no I/O and keeps no clock of its own.
//!
//! [`Gesture`]: handsign_model::Gesture

pub mod assembler;
pub mod classifier;
pub mod motion;
pub mod pose;

pub use assembler::{AssemblerConfig, GestureAssembler, TrackingSource};
pub use classifier::{AngleThresholds, OrientationClassifier};
pub use motion::MotionTracker;
pub use pose::PoseSampler;
