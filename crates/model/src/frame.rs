//! Reference frames and hand poses.
//!
//! Axis conventions follow a left-handed, Y-up world: `lateral` is the
//! frame's right, `vertical` its up, `depth` its forward.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::orientation::AxisPair;

/// Three orthogonal unit axes every classification is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    pub lateral: DVec3,
    pub vertical: DVec3,
    pub depth: DVec3,
}

impl ReferenceFrame {
    /// World axes: right = +X, up = +Y, forward = +Z.
    pub const WORLD: ReferenceFrame = ReferenceFrame {
        lateral: DVec3::X,
        vertical: DVec3::Y,
        depth: DVec3::Z,
    };

    /// Frame of an object with the given world rotation.
    pub fn from_rotation(rotation: DQuat) -> Self {
        Self {
            lateral: rotation * DVec3::X,
            vertical: rotation * DVec3::Y,
            depth: rotation * DVec3::Z,
        }
    }

    pub fn axis(&self, pair: AxisPair) -> DVec3 {
        match pair {
            AxisPair::Lateral => self.lateral,
            AxisPair::Vertical => self.vertical,
            AxisPair::Depth => self.depth,
        }
    }
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self::WORLD
    }
}

/// A tracked hand's position and rotation in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandPose {
    pub position: DVec3,
    pub rotation: DQuat,
}

impl HandPose {
    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    /// A pose at `position` with identity rotation.
    pub fn at(position: DVec3) -> Self {
        Self::new(position, DQuat::IDENTITY)
    }

    /// The hand's own "right" direction.
    pub fn lateral_axis(&self) -> DVec3 {
        self.rotation * DVec3::X
    }
}
