//! Tracking event stream.
//!
//! Sessions are recorded in append-only JSONL: an optional `#`-prefixed
//! header line followed by one event per line. Every event carries `t`,
//! monotonic nanoseconds since session start. `tick` events mark the fixed
//! simulation steps the recognizer runs on; everything between two ticks
//! updates the tracking state the next tick will read.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

pub use handsign_common::clock::TimestampNs;

use crate::hand::HandSide;

/// Current schema version written into session headers.
pub const SCHEMA_VERSION: &str = "1.0";

/// Press state of an engagement signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    Started,
    Canceled,
}

impl SignalState {
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Started)
    }
}

/// A single recorded tracking event with timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    #[serde(flatten)]
    pub kind: TrackingEventKind,
}

/// Discriminated union of tracking event types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingEventKind {
    /// The reference frame (player body / forward facing) rotated.
    Reference { rotation: DQuat },

    /// A new pose sample for one hand.
    Hand {
        hand: HandSide,
        position: DVec3,
        #[serde(default)]
        rotation: DQuat,
    },

    /// The hand's "select" signal (grip) changed.
    Select { hand: HandSide, state: SignalState },

    /// The hand's "activate" signal (trigger) changed.
    Activate { hand: HandSide, state: SignalState },

    /// One fixed simulation step.
    Tick,
}

/// Metadata written as the first line of a session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHeader {
    pub schema_version: String,

    /// Rate the `tick` events were produced at.
    pub tick_rate_hz: u32,

    /// Wall-clock time at session start (RFC 3339).
    pub epoch_wall: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SessionHeader {
    pub fn new(tick_rate_hz: u32, epoch_wall: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tick_rate_hz,
            epoch_wall: epoch_wall.into(),
            description: None,
        }
    }
}

impl TrackingEvent {
    pub fn reference(timestamp_ns: TimestampNs, rotation: DQuat) -> Self {
        Self {
            timestamp_ns,
            kind: TrackingEventKind::Reference { rotation },
        }
    }

    pub fn hand(
        timestamp_ns: TimestampNs,
        hand: HandSide,
        position: DVec3,
        rotation: DQuat,
    ) -> Self {
        Self {
            timestamp_ns,
            kind: TrackingEventKind::Hand {
                hand,
                position,
                rotation,
            },
        }
    }

    pub fn select(timestamp_ns: TimestampNs, hand: HandSide, state: SignalState) -> Self {
        Self {
            timestamp_ns,
            kind: TrackingEventKind::Select { hand, state },
        }
    }

    pub fn activate(timestamp_ns: TimestampNs, hand: HandSide, state: SignalState) -> Self {
        Self {
            timestamp_ns,
            kind: TrackingEventKind::Activate { hand, state },
        }
    }

    pub fn tick(timestamp_ns: TimestampNs) -> Self {
        Self {
            timestamp_ns,
            kind: TrackingEventKind::Tick,
        }
    }

    /// Timestamp as fractional seconds since session start.
    pub fn timestamp_secs(&self) -> f64 {
        handsign_common::clock::ns_to_secs(self.timestamp_ns)
    }

    pub fn is_tick(&self) -> bool {
        matches!(self.kind, TrackingEventKind::Tick)
    }
}

/// Parse events from JSONL content (one JSON object per line).
pub fn parse_events(jsonl: &str) -> Result<Vec<TrackingEvent>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Parse the `# {...}` header line, if the content starts with one.
pub fn parse_header(jsonl: &str) -> Result<Option<SessionHeader>, serde_json::Error> {
    let first = jsonl.lines().map(str::trim).find(|line| !line.is_empty());
    match first.and_then(|line| line.strip_prefix('#')) {
        Some(header) => serde_json::from_str(header.trim()).map(Some),
        None => Ok(None),
    }
}

/// Serialize a header and events to JSONL format.
pub fn serialize_session(
    header: &SessionHeader,
    events: &[TrackingEvent],
) -> Result<String, serde_json::Error> {
    let mut output = format!("# {}\n", serde_json::to_string(header)?);
    for event in events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_format() {
        let event = TrackingEvent::select(20_000_000, HandSide::Left, SignalState::Started);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"t\":20000000"));
        assert!(json.contains("\"type\":\"select\""));
        assert!(json.contains("\"hand\":\"left\""));
        assert!(json.contains("\"state\":\"started\""));

        let tick = serde_json::to_string(&TrackingEvent::tick(5)).unwrap();
        assert_eq!(tick, r#"{"t":5,"type":"tick"}"#);
    }

    #[test]
    fn test_hand_rotation_defaults_to_identity() {
        let line = r#"{"t":0,"type":"hand","hand":"right","position":[0.5,1.0,0.2]}"#;
        let event: TrackingEvent = serde_json::from_str(line).unwrap();
        match event.kind {
            TrackingEventKind::Hand {
                hand,
                position,
                rotation,
            } => {
                assert_eq!(hand, HandSide::Right);
                assert_eq!(position, DVec3::new(0.5, 1.0, 0.2));
                assert_eq!(rotation, DQuat::IDENTITY);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_session_roundtrip_with_header() {
        let header = SessionHeader::new(50, "2026-01-01T00:00:00Z");
        let events = vec![
            TrackingEvent::reference(0, DQuat::IDENTITY),
            TrackingEvent::hand(0, HandSide::Left, DVec3::ZERO, DQuat::IDENTITY),
            TrackingEvent::activate(10, HandSide::Left, SignalState::Started),
            TrackingEvent::tick(20_000_000),
        ];
        let jsonl = serialize_session(&header, &events).unwrap();
        assert!(jsonl.starts_with("# "));

        assert_eq!(parse_header(&jsonl).unwrap(), Some(header));
        assert_eq!(parse_events(&jsonl).unwrap(), events);
    }

    #[test]
    fn test_missing_header_is_none() {
        let jsonl = "{\"t\":0,\"type\":\"tick\"}\n";
        assert_eq!(parse_header(jsonl).unwrap(), None);
        assert!(parse_events(jsonl).unwrap()[0].is_tick());
    }

    #[test]
    fn test_timestamp_secs() {
        assert!((TrackingEvent::tick(1_500_000_000).timestamp_secs() - 1.5).abs() < 1e-9);
    }
}
