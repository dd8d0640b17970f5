//! Built-in action implementations.

use tracing::info;

use handsign_model::gesture::Gesture;

use crate::matcher::GestureAction;

/// Action whose only effect is a log line and a counter.
///
/// Used when replaying sessions from action files, where the interesting
/// output is which actions fired and when.
#[derive(Debug, Clone, Default)]
pub struct TracingAction {
    name: String,
    performed: u64,
}

impl TracingAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            performed: 0,
        }
    }

    pub fn performed(&self) -> u64 {
        self.performed
    }
}

impl GestureAction for TracingAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn perform(&mut self, gesture: &Gesture) {
        self.performed += 1;
        info!(
            action = %self.name,
            hand = %gesture.hand,
            palm = %gesture.palm_orientations,
            motion = %gesture.motion_orientations,
            count = self.performed,
            "Performing action"
        );
    }
}
