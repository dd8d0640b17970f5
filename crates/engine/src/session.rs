//! Session replay.
//!
//! A session ties the tracking state, the gesture assembler and the
//! dispatcher together and feeds them a recorded event stream. Timing comes
//! entirely from the events' timestamps, so a replay is deterministic.

use glam::DQuat;
use serde::Serialize;
use tracing::{debug, info, warn};

use handsign_common::clock::TimestampNs;
use handsign_common::config::AppConfig;
use handsign_common::error::{HandsignError, HandsignResult};
use handsign_model::action::{ActionDefinition, ActionSet};
use handsign_model::event::{TrackingEvent, TrackingEventKind};
use handsign_model::frame::{HandPose, ReferenceFrame};
use handsign_model::gesture::Gesture;
use handsign_model::hand::HandSide;
use handsign_recognition::assembler::{AssemblerConfig, GestureAssembler, Signal, TrackingSource};

use crate::actions::TracingAction;
use crate::dispatcher::Dispatcher;
use crate::matcher::GestureAction;

/// Latest tracking data seen in the event stream.
#[derive(Debug, Clone, Default)]
pub struct TrackingState {
    reference: Option<ReferenceFrame>,
    left: Option<HandPose>,
    right: Option<HandPose>,
}

impl TrackingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reference(&mut self, frame: ReferenceFrame) {
        self.reference = Some(frame);
    }

    pub fn set_pose(&mut self, hand: HandSide, pose: HandPose) {
        match hand {
            HandSide::Left => self.left = Some(pose),
            HandSide::Right => self.right = Some(pose),
        }
    }

    /// Apply a tracking update. Returns false for events that are not
    /// tracking data (signals and ticks). Non-finite samples are rejected.
    pub fn apply(&mut self, kind: &TrackingEventKind) -> HandsignResult<bool> {
        match kind {
            TrackingEventKind::Reference { rotation } => {
                if !is_usable_rotation(rotation) {
                    return Err(HandsignError::tracking("reference rotation is not a usable quaternion"));
                }
                self.set_reference(ReferenceFrame::from_rotation(rotation.normalize()));
                Ok(true)
            }
            TrackingEventKind::Hand {
                hand,
                position,
                rotation,
            } => {
                if !(position.is_finite() && is_usable_rotation(rotation)) {
                    return Err(HandsignError::tracking(format!(
                        "{hand} hand pose is not finite"
                    )));
                }
                self.set_pose(*hand, HandPose::new(*position, rotation.normalize()));
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn is_usable_rotation(rotation: &DQuat) -> bool {
    rotation.is_finite() && rotation.length_squared() > f64::EPSILON
}

impl TrackingSource for TrackingState {
    fn reference_frame(&self) -> Option<ReferenceFrame> {
        self.reference
    }

    fn hand_pose(&self, hand: HandSide) -> Option<HandPose> {
        match hand {
            HandSide::Left => self.left,
            HandSide::Right => self.right,
        }
    }
}

/// One action firing during a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformedAction {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,
    pub action: String,
    pub gesture: Gesture,
}

/// Summary of a replayed session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    pub events: usize,
    pub ticks: u64,
    pub gestures: u64,
    /// Timestamp of the last event.
    pub duration_ns: TimestampNs,
    pub performed: Vec<PerformedAction>,
}

impl SessionReport {
    /// How many times `action` fired.
    pub fn count(&self, action: &str) -> usize {
        self.performed.iter().filter(|p| p.action == action).count()
    }
}

#[derive(Debug)]
pub struct Session {
    assembler: GestureAssembler,
    dispatcher: Dispatcher,
    tracking: TrackingState,
}

impl Session {
    pub fn new(assembler: GestureAssembler, dispatcher: Dispatcher) -> Self {
        Self {
            assembler,
            dispatcher,
            tracking: TrackingState::new(),
        }
    }

    /// Build a session from configuration and action definitions, creating
    /// each action with `factory`.
    pub fn with_factory<F>(config: &AppConfig, actions: &ActionSet, factory: F) -> HandsignResult<Self>
    where
        F: FnMut(&ActionDefinition) -> Box<dyn GestureAction>,
    {
        config.validate()?;
        let assembler = GestureAssembler::new(AssemblerConfig::from_settings(&config.recognition)?);
        let dispatcher = Dispatcher::from_definitions(actions, &config.combo, factory)?;
        Ok(Self::new(assembler, dispatcher))
    }

    /// Build a session whose actions only log when they fire.
    pub fn from_config(config: &AppConfig, actions: &ActionSet) -> HandsignResult<Self> {
        Self::with_factory(config, actions, |definition| {
            Box::new(TracingAction::new(definition.name.clone()))
        })
    }

    pub fn assembler(&self) -> &GestureAssembler {
        &self.assembler
    }

    pub fn assembler_mut(&mut self) -> &mut GestureAssembler {
        &mut self.assembler
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn tracking(&self) -> &TrackingState {
        &self.tracking
    }

    /// Replay `events` in order.
    ///
    /// The actions are live for the duration of the call only: combo state
    /// is cleared when it returns, whether it succeeded or not. Events must
    /// be in non-decreasing timestamp order, and every tick needs a reference
    /// frame to have been seen.
    pub fn replay(&mut self, events: &[TrackingEvent]) -> HandsignResult<SessionReport> {
        let Self {
            assembler,
            dispatcher,
            tracking,
        } = self;

        let mut report = SessionReport {
            events: events.len(),
            ..SessionReport::default()
        };
        let mut active = dispatcher.activate();
        let mut last = 0;

        for (index, event) in events.iter().enumerate() {
            let now = event.timestamp_ns;
            if now < last {
                return Err(HandsignError::session(format!(
                    "event #{index} at t={now} precedes the previous event at t={last}"
                )));
            }
            last = now;

            if tracking.apply(&event.kind)? {
                continue;
            }

            match &event.kind {
                TrackingEventKind::Select { hand, state } => {
                    apply_signal(assembler, tracking, *hand, Signal::Select, state.is_held())?;
                }
                TrackingEventKind::Activate { hand, state } => {
                    apply_signal(assembler, tracking, *hand, Signal::Activate, state.is_held())?;
                }
                TrackingEventKind::Tick => {
                    report.ticks += 1;
                    active.advance(now);

                    let performed = &mut report.performed;
                    let raised = assembler.tick_with(&*tracking, |gesture| {
                        let summary = active.dispatch(gesture, now);
                        for id in summary.performed() {
                            let action = active
                                .dispatcher()
                                .matcher(id)
                                .map(|m| m.name().to_string())
                                .unwrap_or_default();
                            performed.push(PerformedAction {
                                timestamp_ns: now,
                                action,
                                gesture: *gesture,
                            });
                        }
                    })?;
                    report.gestures += raised as u64;
                }
                TrackingEventKind::Reference { .. } | TrackingEventKind::Hand { .. } => {}
            }
        }

        drop(active);
        report.duration_ns = last;

        debug!(events = report.events, ticks = report.ticks, "Replay finished");
        info!(
            gestures = report.gestures,
            performed = report.performed.len(),
            "Session replayed"
        );
        Ok(report)
    }
}

/// Forward a signal edge to the assembler. A hand that engages before its
/// first pose arrives is not fatal: the assembler keeps the signal and takes
/// the origin on the next tick that tracks the hand.
fn apply_signal(
    assembler: &mut GestureAssembler,
    tracking: &TrackingState,
    hand: HandSide,
    signal: Signal,
    held: bool,
) -> HandsignResult<()> {
    match assembler.apply_signal(hand, signal, held, tracking) {
        Err(HandsignError::MissingCollaborator { message }) => {
            warn!(%hand, "{message}");
            Ok(())
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DQuat, DVec3};
    use handsign_model::event::SignalState;
    use handsign_model::gesture::GestureTemplate;
    use handsign_model::orientation::Orientation;

    const MS: u64 = 1_000_000;

    fn clap_actions() -> ActionSet {
        let any = Orientation::ALL.to_vec();
        ActionSet {
            actions: vec![
                ActionDefinition::dual(
                    "clap",
                    vec![
                        GestureTemplate::new(HandSide::Left, any.clone(), [Orientation::Inward]),
                        GestureTemplate::new(HandSide::Right, any.clone(), [Orientation::Inward]),
                    ],
                ),
                ActionDefinition::single(
                    "raise_left",
                    vec![GestureTemplate::new(HandSide::Left, any, [Orientation::Upward])],
                ),
            ],
        }
    }

    fn session() -> Session {
        Session::from_config(&AppConfig::default(), &clap_actions()).unwrap()
    }

    fn pose(t: u64, hand: HandSide, x: f64, y: f64) -> TrackingEvent {
        TrackingEvent::hand(t, hand, DVec3::new(x, y, 0.0), DQuat::IDENTITY)
    }

    fn engage(t: u64, hand: HandSide, state: SignalState) -> [TrackingEvent; 2] {
        [
            TrackingEvent::select(t, hand, state),
            TrackingEvent::activate(t, hand, state),
        ]
    }

    #[test]
    fn test_clap_in_one_tick() {
        let mut events = vec![
            TrackingEvent::reference(0, DQuat::IDENTITY),
            pose(0, HandSide::Left, -0.4, 0.0),
            pose(0, HandSide::Right, 0.4, 0.0),
        ];
        events.extend(engage(0, HandSide::Left, SignalState::Started));
        events.extend(engage(0, HandSide::Right, SignalState::Started));
        events.push(TrackingEvent::tick(20 * MS));
        events.push(pose(30 * MS, HandSide::Left, 0.0, 0.0));
        events.push(pose(30 * MS, HandSide::Right, 0.0, 0.0));
        events.push(TrackingEvent::tick(40 * MS));
        events.extend(engage(50 * MS, HandSide::Left, SignalState::Canceled));
        events.extend(engage(50 * MS, HandSide::Right, SignalState::Canceled));
        events.push(TrackingEvent::tick(60 * MS));

        let report = session().replay(&events).unwrap();
        assert_eq!(report.ticks, 3);
        assert_eq!(report.gestures, 2);
        assert_eq!(report.count("clap"), 1);
        assert_eq!(report.count("raise_left"), 0);

        let clap = &report.performed[0];
        assert_eq!(clap.timestamp_ns, 40 * MS);
        assert_eq!(clap.gesture.hand, HandSide::Right);
        assert_eq!(report.duration_ns, 60 * MS);
    }

    #[test]
    fn test_combo_window_lapses_between_hands() {
        let mut events = vec![
            TrackingEvent::reference(0, DQuat::IDENTITY),
            pose(0, HandSide::Left, -0.4, 0.0),
            pose(0, HandSide::Right, 0.4, 0.0),
        ];
        events.extend(engage(0, HandSide::Left, SignalState::Started));
        events.push(pose(80 * MS, HandSide::Left, 0.0, 0.0));
        events.push(TrackingEvent::tick(100 * MS));
        events.extend(engage(120 * MS, HandSide::Left, SignalState::Canceled));

        events.extend(engage(1_500 * MS, HandSide::Right, SignalState::Started));
        events.push(pose(1_550 * MS, HandSide::Right, 0.0, 0.0));
        events.push(TrackingEvent::tick(1_600 * MS));

        let mut session = session();
        let report = session.replay(&events).unwrap();
        assert_eq!(report.gestures, 2);
        assert_eq!(report.count("clap"), 0);
        assert_eq!(session.dispatcher().pending_timers(), 0);
    }

    #[test]
    fn test_release_keeps_armed_combo_hand() {
        let mut events = vec![
            TrackingEvent::reference(0, DQuat::IDENTITY),
            pose(0, HandSide::Left, -0.4, 0.0),
            pose(0, HandSide::Right, 0.4, 0.0),
        ];
        events.extend(engage(0, HandSide::Left, SignalState::Started));
        events.extend(engage(0, HandSide::Right, SignalState::Started));
        events.push(pose(80 * MS, HandSide::Left, 0.0, 0.0));
        events.push(TrackingEvent::tick(100 * MS));
        events.extend(engage(120 * MS, HandSide::Left, SignalState::Canceled));
        events.push(TrackingEvent::tick(140 * MS));

        events.push(pose(300 * MS, HandSide::Right, 0.0, 0.0));
        events.push(TrackingEvent::tick(320 * MS));

        let report = session().replay(&events).unwrap();
        assert_eq!(report.gestures, 2);
        assert_eq!(report.count("clap"), 1);
        assert_eq!(report.performed[0].timestamp_ns, 320 * MS);
        assert_eq!(report.performed[0].gesture.hand, HandSide::Right);
    }

    #[test]
    fn test_engaging_before_first_pose_is_deferred() {
        let mut events = vec![TrackingEvent::reference(0, DQuat::IDENTITY)];
        events.extend(engage(0, HandSide::Left, SignalState::Started));
        events.push(pose(10 * MS, HandSide::Left, 0.0, 0.0));
        events.push(TrackingEvent::tick(20 * MS));
        events.push(pose(30 * MS, HandSide::Left, 0.0, 0.5));
        events.push(TrackingEvent::tick(40 * MS));

        let mut session = session();
        let report = session.replay(&events).unwrap();
        assert_eq!(report.gestures, 1);
        assert_eq!(report.count("raise_left"), 1);
        assert_eq!(
            session.assembler().motion_tracker(HandSide::Left).origin(),
            Some(DVec3::ZERO)
        );
    }

    #[test]
    fn test_single_hand_action_repeats_every_tick() {
        let mut events = vec![
            TrackingEvent::reference(0, DQuat::IDENTITY),
            pose(0, HandSide::Left, 0.0, 0.0),
        ];
        events.extend(engage(0, HandSide::Left, SignalState::Started));
        events.push(pose(10 * MS, HandSide::Left, 0.0, 0.5));
        events.push(TrackingEvent::tick(20 * MS));
        events.push(TrackingEvent::tick(40 * MS));

        let report = session().replay(&events).unwrap();
        assert_eq!(report.count("raise_left"), 2);
    }

    #[test]
    fn test_tick_without_reference_fails_and_clears() {
        let mut events = vec![pose(0, HandSide::Left, -0.4, 0.0)];
        events.extend(engage(0, HandSide::Left, SignalState::Started));
        events.push(TrackingEvent::tick(20 * MS));

        let mut session = session();
        let err = session.replay(&events).unwrap_err();
        assert!(matches!(err, HandsignError::MissingCollaborator { .. }));
        assert_eq!(session.dispatcher().pending_timers(), 0);
    }

    #[test]
    fn test_out_of_order_events_fail() {
        let events = vec![
            TrackingEvent::reference(10, DQuat::IDENTITY),
            TrackingEvent::tick(5),
        ];
        assert!(matches!(
            session().replay(&events),
            Err(HandsignError::Session { .. })
        ));
    }

    #[test]
    fn test_report_serializes_performed_actions() {
        let report = SessionReport {
            events: 3,
            ticks: 1,
            gestures: 1,
            duration_ns: 20 * MS,
            performed: vec![PerformedAction {
                timestamp_ns: 20 * MS,
                action: "raise_left".to_string(),
                gesture: Gesture::new(
                    Default::default(),
                    [Orientation::Upward].into(),
                    HandSide::Left,
                ),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["performed"][0]["t"], 20_000_000);
        assert_eq!(json["performed"][0]["action"], "raise_left");
        assert_eq!(json["performed"][0]["gesture"]["motion"][0], "upward");
    }

    #[test]
    fn test_tracking_state_apply() {
        let mut state = TrackingState::new();
        assert!(state
            .apply(&TrackingEventKind::Reference {
                rotation: DQuat::IDENTITY
            })
            .unwrap());
        assert!(!state.apply(&TrackingEventKind::Tick).unwrap());
        assert_eq!(state.reference_frame(), Some(ReferenceFrame::WORLD));
        assert!(state.hand_pose(HandSide::Right).is_none());

        let broken = TrackingEventKind::Hand {
            hand: HandSide::Right,
            position: DVec3::new(f64::NAN, 0.0, 0.0),
            rotation: DQuat::IDENTITY,
        };
        assert!(matches!(
            state.apply(&broken),
            Err(HandsignError::Tracking { .. })
        ));
        assert!(state.hand_pose(HandSide::Right).is_none());
    }
}
