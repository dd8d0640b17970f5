//! Handsign Data Model
//!
//! Defines the data contracts shared by the recognizer and the engine:
//! - **Orientations:** the six directional labels and sets of them
//! - **Hands:** hand identity and hand-requirement flags
//! - **Gestures:** gesture events and the templates actions match against
//! - **Frames:** reference frames and hand poses
//! - **Events:** recorded tracking sessions in JSONL form
//! - **Actions:** serializable action definitions

pub mod action;
pub mod event;
pub mod frame;
pub mod gesture;
pub mod hand;
pub mod orientation;

pub use action::*;
pub use event::*;
pub use frame::*;
pub use gesture::*;
pub use hand::*;
pub use orientation::*;
