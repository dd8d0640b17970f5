//! Per-hand motion tracking.
//!
//! A tracker is engaged when the hand's engagement signals are both held,
//! remembers where the hand was at that moment, and on each sample
//! classifies the displacement since then once it exceeds the distance
//! threshold.

use glam::DVec3;
use tracing::debug;

use handsign_model::frame::ReferenceFrame;
use handsign_model::hand::HandSide;
use handsign_model::orientation::{AxisPair, OrientationSet};

use crate::classifier::OrientationClassifier;

/// Lifecycle state of a motion tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerState {
    Idle,
    Tracking { origin: DVec3 },
}

/// Displacement tracker for one hand.
#[derive(Debug, Clone)]
pub struct MotionTracker {
    hand: HandSide,
    distance_threshold: f64,
    classifier: OrientationClassifier,
    state: TrackerState,
    /// Labels produced by the most recent sample.
    motion: OrientationSet,
}

impl MotionTracker {
    pub fn new(hand: HandSide, distance_threshold: f64, classifier: OrientationClassifier) -> Self {
        Self {
            hand,
            distance_threshold,
            classifier,
            state: TrackerState::Idle,
            motion: OrientationSet::EMPTY,
        }
    }

    pub fn hand(&self) -> HandSide {
        self.hand
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackerState::Tracking { .. })
    }

    /// Where tracking started, if engaged.
    pub fn origin(&self) -> Option<DVec3> {
        match self.state {
            TrackerState::Tracking { origin } => Some(origin),
            TrackerState::Idle => None,
        }
    }

    /// Labels from the last call to [`sample`](Self::sample).
    pub fn last_motion(&self) -> OrientationSet {
        self.motion
    }

    /// Start tracking from `position`. Returns false if already tracking,
    /// in which case the original origin is kept.
    pub fn engage(&mut self, position: DVec3) -> bool {
        if self.is_tracking() {
            return false;
        }
        debug!(hand = %self.hand, origin = ?position, "Motion tracking engaged");
        self.state = TrackerState::Tracking { origin: position };
        true
    }

    /// Stop tracking and forget the last result. Returns false if already idle.
    pub fn disengage(&mut self) -> bool {
        self.motion.clear();
        if !self.is_tracking() {
            return false;
        }
        debug!(hand = %self.hand, "Motion tracking disengaged");
        self.state = TrackerState::Idle;
        true
    }

    /// Classify the displacement from the origin to `position`.
    ///
    /// Empty while idle or while the displacement does not strictly exceed
    /// the distance threshold. The lateral comparison uses the negated
    /// direction for the right hand, so moving a hand toward the body's
    /// midline reads inward on both sides.
    pub fn sample(&mut self, position: DVec3, frame: &ReferenceFrame) -> OrientationSet {
        self.motion.clear();

        let Some(origin) = self.origin() else {
            return self.motion;
        };

        let displacement = position - origin;
        let distance = displacement.length();
        if !(distance > self.distance_threshold) {
            return self.motion;
        }

        let direction = displacement / distance;
        let heading = match self.hand {
            HandSide::Left => direction,
            HandSide::Right => -direction,
        };

        if let Some(label) = self
            .classifier
            .classify(heading, frame.lateral, AxisPair::Lateral)
        {
            self.motion.insert(label);
        }
        if let Some(label) = self
            .classifier
            .classify(direction, frame.vertical, AxisPair::Vertical)
        {
            self.motion.insert(label);
        }
        if let Some(label) = self
            .classifier
            .classify(direction, frame.depth, AxisPair::Depth)
        {
            self.motion.insert(label);
        }

        self.motion
    }
}
