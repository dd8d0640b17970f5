//! Static palm orientation sampling.

use glam::DVec3;

use handsign_model::frame::{HandPose, ReferenceFrame};
use handsign_model::hand::HandSide;
use handsign_model::orientation::{AxisPair, OrientationSet};

use crate::classifier::OrientationClassifier;

/// Samples which way a hand's palm is facing relative to a reference frame.
///
/// The hand's lateral axis is compared against the frame's lateral axis as
/// is. For the depth and vertical pairs the right hand's lateral axis is
/// negated first, so the same palm pose yields the same labels on either
/// hand.
#[derive(Debug, Clone)]
pub struct PoseSampler {
    hand: HandSide,
    classifier: OrientationClassifier,
}

impl PoseSampler {
    pub fn new(hand: HandSide, classifier: OrientationClassifier) -> Self {
        Self { hand, classifier }
    }

    pub fn hand(&self) -> HandSide {
        self.hand
    }

    /// Classify a hand lateral axis. Recomputed on every call.
    pub fn sample(&self, lateral_axis: DVec3, frame: &ReferenceFrame) -> OrientationSet {
        let mut labels = OrientationSet::new();

        if let Some(label) = self
            .classifier
            .classify(lateral_axis, frame.lateral, AxisPair::Lateral)
        {
            labels.insert(label);
        }

        let facing = match self.hand {
            HandSide::Left => lateral_axis,
            HandSide::Right => -lateral_axis,
        };

        if let Some(label) = self.classifier.classify(facing, frame.depth, AxisPair::Depth) {
            labels.insert(label);
        }
        if let Some(label) = self
            .classifier
            .classify(facing, frame.vertical, AxisPair::Vertical)
        {
            labels.insert(label);
        }

        labels
    }

    pub fn sample_pose(&self, pose: &HandPose, frame: &ReferenceFrame) -> OrientationSet {
        self.sample(pose.lateral_axis(), frame)
    }
}
