//! Generate a synthetic two-handed session on the fixed tick clock.

use std::path::PathBuf;

use glam::{DQuat, DVec3};

use handsign_common::clock::TickClock;
use handsign_model::event::{serialize_session, SessionHeader, SignalState, TrackingEvent};
use handsign_model::hand::HandSide;

const LEFT_REST: DVec3 = DVec3::new(-0.4, 1.2, 0.4);
const RIGHT_REST: DVec3 = DVec3::new(0.4, 1.2, 0.4);
const LEFT_MEET: DVec3 = DVec3::new(-0.02, 1.2, 0.4);
const RIGHT_MEET: DVec3 = DVec3::new(0.02, 1.2, 0.4);

/// Seconds each hand takes to travel to the middle.
const MOVE_SECS: f64 = 0.25;
/// Seconds both hands hold still before release.
const HOLD_SECS: f64 = 0.2;
/// Highest rate the nanosecond clock can step at.
const MAX_RATE_HZ: u32 = 1_000_000_000;

pub fn run(output: PathBuf, rate: u32, gap: f64) -> anyhow::Result<()> {
    if rate == 0 || rate > MAX_RATE_HZ {
        anyhow::bail!("tick rate must be between 1 and {MAX_RATE_HZ} Hz, got {rate}");
    }
    if !(gap.is_finite() && gap >= 0.0) {
        anyhow::bail!("gap must be a non-negative number of seconds, got {gap}");
    }

    let mut clock = TickClock::new(rate);
    let events = clap_session(&mut clock, gap);

    let mut header = SessionHeader::new(rate, clock.epoch_wall());
    header.description = Some(format!("synthetic clap, right hand {gap:.2}s behind left"));
    std::fs::write(&output, serialize_session(&header, &events)?)?;

    println!(
        "Wrote {} events ({} ticks) to {}",
        events.len(),
        clock.ticks(),
        output.display()
    );
    Ok(())
}

/// Both hands engage at rest, the left hand sweeps to the middle, the right
/// hand follows `gap` seconds later, then both release.
fn clap_session(clock: &mut TickClock, gap: f64) -> Vec<TrackingEvent> {
    let mut events = Vec::new();
    let start = clock.now_ns();

    events.push(TrackingEvent::reference(start, DQuat::IDENTITY));
    events.push(TrackingEvent::hand(start, HandSide::Left, LEFT_REST, DQuat::IDENTITY));
    events.push(TrackingEvent::hand(start, HandSide::Right, RIGHT_REST, DQuat::IDENTITY));
    for hand in HandSide::BOTH {
        events.push(TrackingEvent::select(start, hand, SignalState::Started));
        events.push(TrackingEvent::activate(start, hand, SignalState::Started));
    }

    let move_ticks = clock.ticks_in(MOVE_SECS).max(1);
    let gap_ticks = clock.ticks_in(gap);
    let total = gap_ticks + move_ticks + clock.ticks_in(HOLD_SECS);

    for step in 1..=total {
        let now = clock.advance();
        let left = LEFT_REST.lerp(LEFT_MEET, progress(step, 0, move_ticks));
        let right = RIGHT_REST.lerp(RIGHT_MEET, progress(step, gap_ticks, move_ticks));
        events.push(TrackingEvent::hand(now, HandSide::Left, left, DQuat::IDENTITY));
        events.push(TrackingEvent::hand(now, HandSide::Right, right, DQuat::IDENTITY));
        events.push(TrackingEvent::tick(now));
    }

    let release = clock.advance();
    for hand in HandSide::BOTH {
        events.push(TrackingEvent::select(release, hand, SignalState::Canceled));
        events.push(TrackingEvent::activate(release, hand, SignalState::Canceled));
    }
    events.push(TrackingEvent::tick(release));

    events
}

fn progress(step: u64, start: u64, len: u64) -> f64 {
    (step.saturating_sub(start) as f64 / len as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use handsign_common::config::{AppConfig, EmissionMode};
    use handsign_engine::session::Session;
    use handsign_model::action::{ActionDefinition, ActionSet};
    use handsign_model::gesture::GestureTemplate;
    use handsign_model::orientation::Orientation;

    fn clap_actions() -> ActionSet {
        let any = Orientation::ALL.to_vec();
        ActionSet {
            actions: vec![ActionDefinition::dual(
                "clap",
                vec![
                    GestureTemplate::new(HandSide::Left, any.clone(), [Orientation::Inward]),
                    GestureTemplate::new(HandSide::Right, any, [Orientation::Inward]),
                ],
            )],
        }
    }

    fn replay_clap(gap: f64) -> usize {
        let mut clock = TickClock::with_epoch(50, "2026-01-01T00:00:00Z".to_string());
        let events = clap_session(&mut clock, gap);

        let mut config = AppConfig::default();
        config.recognition.emission = EmissionMode::OncePerCrossing;
        let mut session = Session::from_config(&config, &clap_actions()).unwrap();
        session.replay(&events).unwrap().count("clap")
    }

    #[test]
    fn test_synthetic_clap_completes_within_window() {
        assert_eq!(replay_clap(0.2), 1);
    }

    #[test]
    fn test_synthetic_clap_misses_with_long_gap() {
        assert_eq!(replay_clap(1.5), 0);
    }

    #[test]
    fn test_rejects_rates_beyond_clock_resolution() {
        let output = std::env::temp_dir().join("handsign-synth-rate.jsonl");
        assert!(run(output.clone(), 0, 0.2).is_err());
        assert!(run(output.clone(), MAX_RATE_HZ + 1, 0.2).is_err());
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(progress(0, 2, 4), 0.0);
        assert_eq!(progress(4, 2, 4), 0.5);
        assert_eq!(progress(10, 2, 4), 1.0);
    }
}
