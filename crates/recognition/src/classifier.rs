//! Angle-to-label bucketing.
//!
//! Every orientation label in Handsign comes from one rule: measure the
//! angle between a direction and one reference axis, then
//!
//! - angle `< low`  → the pair's "toward" label,
//! - angle `> high` → the pair's "away" label,
//! - otherwise      → no label (dead zone).
//!
//! Both bounds are exclusive, so an angle of exactly `low` or `high` lands
//! in the dead zone.

use glam::DVec3;

use handsign_common::config::RecognitionSettings;
use handsign_common::error::{HandsignError, HandsignResult};
use handsign_model::frame::ReferenceFrame;
use handsign_model::orientation::{AxisPair, Orientation, OrientationSet};

/// Dead-zone bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleThresholds {
    pub low_deg: f64,
    pub high_deg: f64,
}

impl Default for AngleThresholds {
    fn default() -> Self {
        Self {
            low_deg: 45.0,
            high_deg: 135.0,
        }
    }
}

impl AngleThresholds {
    pub fn new(low_deg: f64, high_deg: f64) -> HandsignResult<Self> {
        if !(0.0..=180.0).contains(&low_deg)
            || !(0.0..=180.0).contains(&high_deg)
            || low_deg >= high_deg
        {
            return Err(HandsignError::config(format!(
                "invalid angle thresholds {low_deg}/{high_deg}"
            )));
        }
        Ok(Self { low_deg, high_deg })
    }

    pub fn from_settings(settings: &RecognitionSettings) -> HandsignResult<Self> {
        Self::new(settings.low_angle_deg, settings.high_angle_deg)
    }
}

/// Angle between two directions in degrees, in `[0, 180]`.
///
/// Returns NaN when either vector has zero length, which classifies as no label.
pub fn angle_between_deg(a: DVec3, b: DVec3) -> f64 {
    a.angle_between(b).to_degrees()
}

/// Pure classifier over one axis pair at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrientationClassifier {
    thresholds: AngleThresholds,
}

impl OrientationClassifier {
    pub fn new(thresholds: AngleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> AngleThresholds {
        self.thresholds
    }

    /// Bucket an already-measured angle.
    pub fn classify_angle(&self, angle_deg: f64, pair: AxisPair) -> Option<Orientation> {
        if angle_deg < self.thresholds.low_deg {
            Some(pair.toward())
        } else if angle_deg > self.thresholds.high_deg {
            Some(pair.away())
        } else {
            None
        }
    }

    /// Classify `axis` against `reference`, labelling the result with `pair`.
    pub fn classify(&self, axis: DVec3, reference: DVec3, pair: AxisPair) -> Option<Orientation> {
        self.classify_angle(angle_between_deg(axis, reference), pair)
    }

    /// Classify one direction against all three axes of `frame`.
    pub fn classify_in_frame(&self, direction: DVec3, frame: &ReferenceFrame) -> OrientationSet {
        AxisPair::ALL
            .into_iter()
            .filter_map(|pair| self.classify(direction, frame.axis(pair), pair))
            .collect()
    }
}
