//! Orientation labels and label sets.
//!
//! Six labels over three independent axis pairs. A set is stored as a bit
//! mask, so it is `Copy`, iterates in label order, and cannot hold
//! duplicates. On the wire a set is a plain list of labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One discrete directional label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Inward,
    Outward,
    Upward,
    Downward,
    Forward,
    Backward,
}

/// The three axes of a reference frame, each owning two opposite labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisPair {
    /// Inward / Outward, measured against the frame's "right" axis.
    Lateral,
    /// Upward / Downward, measured against the frame's "up" axis.
    Vertical,
    /// Forward / Backward, measured against the frame's "forward" axis.
    Depth,
}

impl Orientation {
    pub const ALL: [Orientation; 6] = [
        Orientation::Inward,
        Orientation::Outward,
        Orientation::Upward,
        Orientation::Downward,
        Orientation::Forward,
        Orientation::Backward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inward => "inward",
            Self::Outward => "outward",
            Self::Upward => "upward",
            Self::Downward => "downward",
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }

    /// The axis pair this label belongs to.
    pub fn pair(&self) -> AxisPair {
        match self {
            Self::Inward | Self::Outward => AxisPair::Lateral,
            Self::Upward | Self::Downward => AxisPair::Vertical,
            Self::Forward | Self::Backward => AxisPair::Depth,
        }
    }

    /// The other label of the same pair.
    pub fn opposite(&self) -> Orientation {
        match self {
            Self::Inward => Self::Outward,
            Self::Outward => Self::Inward,
            Self::Upward => Self::Downward,
            Self::Downward => Self::Upward,
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AxisPair {
    pub const ALL: [AxisPair; 3] = [AxisPair::Lateral, AxisPair::Vertical, AxisPair::Depth];

    /// Label for a direction close to the reference axis.
    pub fn toward(&self) -> Orientation {
        match self {
            Self::Lateral => Orientation::Inward,
            Self::Vertical => Orientation::Upward,
            Self::Depth => Orientation::Forward,
        }
    }

    /// Label for a direction close to the negated reference axis.
    pub fn away(&self) -> Orientation {
        self.toward().opposite()
    }
}

/// A set of orientation labels.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Orientation>", into = "Vec<Orientation>")]
pub struct OrientationSet(u8);

impl OrientationSet {
    pub const EMPTY: OrientationSet = OrientationSet(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn insert(&mut self, orientation: Orientation) {
        self.0 |= orientation.bit();
    }

    pub fn remove(&mut self, orientation: Orientation) {
        self.0 &= !orientation.bit();
    }

    pub fn contains(&self, orientation: Orientation) -> bool {
        self.0 & orientation.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn intersection(&self, other: &OrientationSet) -> OrientationSet {
        OrientationSet(self.0 & other.0)
    }

    /// Whether the two sets share at least one label.
    pub fn intersects(&self, other: &OrientationSet) -> bool {
        self.0 & other.0 != 0
    }

    /// The label of `pair` in this set, if exactly one is present.
    pub fn label_for(&self, pair: AxisPair) -> Option<Orientation> {
        match (self.contains(pair.toward()), self.contains(pair.away())) {
            (true, false) => Some(pair.toward()),
            (false, true) => Some(pair.away()),
            _ => None,
        }
    }

    /// True when no pair has both of its labels set.
    pub fn is_consistent(&self) -> bool {
        AxisPair::ALL
            .iter()
            .all(|pair| !(self.contains(pair.toward()) && self.contains(pair.away())))
    }

    pub fn iter(&self) -> impl Iterator<Item = Orientation> + '_ {
        Orientation::ALL
            .into_iter()
            .filter(move |orientation| self.contains(*orientation))
    }
}

impl FromIterator<Orientation> for OrientationSet {
    fn from_iter<I: IntoIterator<Item = Orientation>>(iter: I) -> Self {
        let mut set = OrientationSet::new();
        for orientation in iter {
            set.insert(orientation);
        }
        set
    }
}

impl<const N: usize> From<[Orientation; N]> for OrientationSet {
    fn from(labels: [Orientation; N]) -> Self {
        labels.into_iter().collect()
    }
}

impl From<Vec<Orientation>> for OrientationSet {
    fn from(labels: Vec<Orientation>) -> Self {
        labels.into_iter().collect()
    }
}

impl From<OrientationSet> for Vec<Orientation> {
    fn from(set: OrientationSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for OrientationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for OrientationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let labels: Vec<&str> = self.iter().map(|o| o.as_str()).collect();
        f.write_str(&labels.join("+"))
    }
}
