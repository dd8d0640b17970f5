//! Handsign Engine
//!
//! Matches gesture events against registered actions and drives recorded
//! sessions end to end:
//! - **Scheduler:** cancellable, replaceable deadlines on the tick timeline
//! - **Matcher:** per-action templates and the dual-hand combo state machine
//! - **Dispatcher:** ordered fan-out of each gesture to every action
//! - **Session:** replays a tracking event stream through recognition and dispatch
//!
//! Everything runs on the caller's thread, one tick at a time.

pub mod actions;
pub mod dispatcher;
pub mod matcher;
pub mod scheduler;
pub mod session;

pub use actions::TracingAction;
pub use dispatcher::{Activation, DispatchSummary, Dispatcher};
pub use matcher::{
    ActionId, ActionMode, ComboState, ComboTimer, GestureAction, GestureMatcher, MatchOutcome,
    SkipReason,
};
pub use scheduler::TickScheduler;
pub use session::{PerformedAction, Session, SessionReport, TrackingState};
