//! Hand identity and hand-requirement flags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which hand a sample or gesture came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Processing order within a tick: left first, then right.
    pub const BOTH: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn other(&self) -> HandSide {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Self::Left)
    }

    /// This hand as a single-bit flag.
    pub fn flags(&self) -> HandFlags {
        match self {
            Self::Left => HandFlags::Left,
            Self::Right => HandFlags::Right,
        }
    }
}

impl fmt::Display for HandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HandSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            other => Err(format!("unknown hand '{other}', expected left or right")),
        }
    }
}

/// A hand requirement expressed as bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum HandFlags {
    Left = 0b01,
    Right = 0b10,
    Both = 0b11,
}

impl HandFlags {
    pub fn bits(&self) -> u8 {
        *self as u8
    }

    pub fn from_bits(bits: u8) -> Option<HandFlags> {
        match bits {
            0b01 => Some(Self::Left),
            0b10 => Some(Self::Right),
            0b11 => Some(Self::Both),
            _ => None,
        }
    }

    pub fn contains(&self, hand: HandSide) -> bool {
        self.bits() & hand.flags().bits() != 0
    }

    pub fn union(&self, other: HandFlags) -> HandFlags {
        // Both operands are non-empty, so the union always maps back.
        Self::from_bits(self.bits() | other.bits()).unwrap_or(Self::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Both => "both",
        }
    }
}

impl From<HandSide> for HandFlags {
    fn from(hand: HandSide) -> Self {
        hand.flags()
    }
}

impl fmt::Display for HandFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_bits() {
        assert_eq!(HandSide::Left.flags().bits(), 0b01);
        assert_eq!(HandSide::Right.flags().bits(), 0b10);
        assert_eq!(HandFlags::Left.union(HandFlags::Right), HandFlags::Both);
        assert_eq!(HandFlags::from_bits(0), None);
    }

    #[test]
    fn test_contains() {
        assert!(HandFlags::Both.contains(HandSide::Left));
        assert!(HandFlags::Both.contains(HandSide::Right));
        assert!(!HandFlags::Left.contains(HandSide::Right));
    }

    #[test]
    fn test_parse_hand_side() {
        assert_eq!("Left".parse::<HandSide>(), Ok(HandSide::Left));
        assert_eq!("r".parse::<HandSide>(), Ok(HandSide::Right));
        assert!("middle".parse::<HandSide>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&HandFlags::Both).unwrap(), "\"both\"");
        assert_eq!(
            serde_json::from_str::<HandSide>("\"right\"").unwrap(),
            HandSide::Right
        );
        assert_eq!(HandSide::Left.other(), HandSide::Right);
    }
}
