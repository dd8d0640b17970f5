//! Gesture events and the templates actions match them against.

use serde::{Deserialize, Serialize};

use crate::hand::{HandFlags, HandSide};
use crate::orientation::OrientationSet;

/// One recognized gesture: the palm pose and motion direction of a hand
/// during a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gesture {
    /// Static orientation of the palm relative to the reference frame.
    #[serde(rename = "palm")]
    pub palm_orientations: OrientationSet,

    /// Direction the hand moved since it was engaged.
    #[serde(rename = "motion")]
    pub motion_orientations: OrientationSet,

    pub hand: HandSide,
}

impl Gesture {
    pub fn new(palm: OrientationSet, motion: OrientationSet, hand: HandSide) -> Self {
        Self {
            palm_orientations: palm,
            motion_orientations: motion,
            hand,
        }
    }
}

/// The first check a template failed against a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMismatch {
    Hand,
    Palm,
    Motion,
}

/// An acceptance pattern for gestures.
///
/// A gesture matches when its hand equals `required_hand` and both of its
/// orientation sets share at least one label with the corresponding
/// acceptance set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GestureTemplate {
    #[serde(rename = "hand")]
    pub required_hand: HandFlags,

    #[serde(rename = "palm")]
    pub acceptable_palm_orientations: OrientationSet,

    #[serde(rename = "motion")]
    pub acceptable_motion_orientations: OrientationSet,
}

impl GestureTemplate {
    pub fn new(
        required_hand: impl Into<HandFlags>,
        palm: impl Into<OrientationSet>,
        motion: impl Into<OrientationSet>,
    ) -> Self {
        Self {
            required_hand: required_hand.into(),
            acceptable_palm_orientations: palm.into(),
            acceptable_motion_orientations: motion.into(),
        }
    }

    /// Run the checks in order and report the first one that fails.
    pub fn mismatch(&self, gesture: &Gesture) -> Option<TemplateMismatch> {
        if self.required_hand != gesture.hand.flags() {
            return Some(TemplateMismatch::Hand);
        }
        if !self
            .acceptable_palm_orientations
            .intersects(&gesture.palm_orientations)
        {
            return Some(TemplateMismatch::Palm);
        }
        if !self
            .acceptable_motion_orientations
            .intersects(&gesture.motion_orientations)
        {
            return Some(TemplateMismatch::Motion);
        }
        None
    }

    pub fn matches(&self, gesture: &Gesture) -> bool {
        self.mismatch(gesture).is_none()
    }

    /// Whether any gesture could match. Gestures always come from a single
    /// hand, so a template requiring both hands never matches, and neither
    /// does one with an empty acceptance set.
    pub fn is_satisfiable(&self) -> bool {
        self.required_hand != HandFlags::Both
            && !self.acceptable_palm_orientations.is_empty()
            && !self.acceptable_motion_orientations.is_empty()
    }
}
