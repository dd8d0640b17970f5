//! Gesture assembly.
//!
//! The assembler owns one pose sampler and one motion tracker per hand,
//! follows each hand's engagement signals, and on every fixed tick polls the
//! left hand then the right hand, raising a [`Gesture`] for each hand whose
//! motion crossed the distance threshold.

use tracing::{debug, trace};

use handsign_common::config::{EmissionMode, RecognitionSettings};
use handsign_common::error::{HandsignError, HandsignResult};
use handsign_model::frame::{HandPose, ReferenceFrame};
use handsign_model::gesture::Gesture;
use handsign_model::hand::HandSide;

use crate::classifier::{AngleThresholds, OrientationClassifier};
use crate::motion::MotionTracker;
use crate::pose::PoseSampler;

/// Where the assembler reads the current tracking state from.
pub trait TrackingSource {
    /// The frame all orientations are measured against.
    fn reference_frame(&self) -> Option<ReferenceFrame>;

    /// Latest pose of `hand`, or `None` if the hand is not tracked.
    fn hand_pose(&self, hand: HandSide) -> Option<HandPose>;
}

/// Configuration for the gesture assembler.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Displacement (world units) a hand must strictly exceed to register motion.
    pub distance_threshold: f64,

    pub thresholds: AngleThresholds,

    pub left_enabled: bool,
    pub right_enabled: bool,

    pub emission: EmissionMode,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.3,
            thresholds: AngleThresholds::default(),
            left_enabled: true,
            right_enabled: true,
            emission: EmissionMode::EveryTick,
        }
    }
}

impl AssemblerConfig {
    /// Build an assembler config from application settings, validating them.
    pub fn from_settings(settings: &RecognitionSettings) -> HandsignResult<Self> {
        settings.validate()?;
        Ok(Self {
            distance_threshold: settings.distance_threshold,
            thresholds: AngleThresholds::from_settings(settings)?,
            left_enabled: settings.left_hand_enabled,
            right_enabled: settings.right_hand_enabled,
            emission: settings.emission,
        })
    }
}

/// Which engagement signal changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Grip.
    Select,
    /// Trigger.
    Activate,
}

/// Per-hand recognition state.
#[derive(Debug, Clone)]
struct HandChannel {
    pose: PoseSampler,
    motion: MotionTracker,
    enabled: bool,
    selected: bool,
    activated: bool,
    /// Whether the previous poll raised a gesture (edge-triggered emission).
    past_threshold: bool,
}

impl HandChannel {
    fn new(hand: HandSide, config: &AssemblerConfig, enabled: bool) -> Self {
        let classifier = OrientationClassifier::new(config.thresholds);
        Self {
            pose: PoseSampler::new(hand, classifier),
            motion: MotionTracker::new(hand, config.distance_threshold, classifier),
            enabled,
            selected: false,
            activated: false,
            past_threshold: false,
        }
    }

    fn engaged(&self) -> bool {
        self.selected && self.activated
    }
}

/// Polls both hands each tick and composes gesture events.
#[derive(Debug, Clone)]
pub struct GestureAssembler {
    config: AssemblerConfig,
    left: HandChannel,
    right: HandChannel,
    gestures_raised: u64,
}

impl GestureAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        let left = HandChannel::new(HandSide::Left, &config, config.left_enabled);
        let right = HandChannel::new(HandSide::Right, &config, config.right_enabled);
        Self {
            config,
            left,
            right,
            gestures_raised: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(AssemblerConfig::default())
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    fn channel(&self, hand: HandSide) -> &HandChannel {
        match hand {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }

    fn channel_mut(&mut self, hand: HandSide) -> &mut HandChannel {
        match hand {
            HandSide::Left => &mut self.left,
            HandSide::Right => &mut self.right,
        }
    }

    /// Whether `hand` currently has both engagement signals held.
    pub fn is_engaged(&self, hand: HandSide) -> bool {
        self.channel(hand).engaged()
    }

    pub fn motion_tracker(&self, hand: HandSide) -> &MotionTracker {
        &self.channel(hand).motion
    }

    pub fn is_hand_enabled(&self, hand: HandSide) -> bool {
        self.channel(hand).enabled
    }

    /// Enable or disable recognition for one hand. Engagement is still
    /// followed while disabled; only emission stops.
    pub fn set_hand_enabled(&mut self, hand: HandSide, enabled: bool) {
        let channel = self.channel_mut(hand);
        if channel.enabled != enabled {
            debug!(%hand, enabled, "Hand recognition toggled");
        }
        channel.enabled = enabled;
        channel.past_threshold = false;
    }

    /// Total gestures raised since construction.
    pub fn gestures_raised(&self) -> u64 {
        self.gestures_raised
    }

    pub fn set_selected(
        &mut self,
        hand: HandSide,
        held: bool,
        source: &impl TrackingSource,
    ) -> HandsignResult<()> {
        self.apply_signal(hand, Signal::Select, held, source)
    }

    pub fn set_activated(
        &mut self,
        hand: HandSide,
        held: bool,
        source: &impl TrackingSource,
    ) -> HandsignResult<()> {
        self.apply_signal(hand, Signal::Activate, held, source)
    }

    /// Record a signal transition and engage or disengage the hand's tracker.
    ///
    /// Engaging reads the hand's current position from `source`. An untracked
    /// hand at that moment is reported as an error, but the signal is kept and
    /// the tracker takes its origin from the first pose seen on a later tick.
    pub fn apply_signal(
        &mut self,
        hand: HandSide,
        signal: Signal,
        held: bool,
        source: &impl TrackingSource,
    ) -> HandsignResult<()> {
        let channel = self.channel_mut(hand);
        match signal {
            Signal::Select => channel.selected = held,
            Signal::Activate => channel.activated = held,
        }

        if channel.engaged() {
            let pose = source.hand_pose(hand).ok_or_else(|| {
                HandsignError::missing_collaborator(format!(
                    "{hand} hand engaged without a tracked pose; origin deferred to next tracked tick"
                ))
            })?;
            self.channel_mut(hand).motion.engage(pose.position);
        } else {
            let channel = self.channel_mut(hand);
            channel.motion.disengage();
            channel.past_threshold = false;
        }
        Ok(())
    }

    /// Run one fixed tick, handing each raised gesture to `raise` as soon as
    /// it is built: the left hand's gesture is delivered before the right
    /// hand is sampled.
    pub fn tick_with<S, F>(&mut self, source: &S, mut raise: F) -> HandsignResult<usize>
    where
        S: TrackingSource,
        F: FnMut(&Gesture),
    {
        let frame = source.reference_frame().ok_or_else(|| {
            HandsignError::missing_collaborator("no reference frame available for tick")
        })?;

        let mut raised = 0;
        for hand in HandSide::BOTH {
            if let Some(gesture) = self.poll_hand(hand, &frame, source) {
                self.gestures_raised += 1;
                raised += 1;
                raise(&gesture);
            }
        }
        Ok(raised)
    }

    /// Run one fixed tick and collect the raised gestures, left first.
    pub fn tick(&mut self, source: &impl TrackingSource) -> HandsignResult<Vec<Gesture>> {
        let mut gestures = Vec::with_capacity(2);
        self.tick_with(source, |gesture| gestures.push(*gesture))?;
        Ok(gestures)
    }

    fn poll_hand(
        &mut self,
        hand: HandSide,
        frame: &ReferenceFrame,
        source: &impl TrackingSource,
    ) -> Option<Gesture> {
        let emission = self.config.emission;
        let channel = self.channel_mut(hand);
        if !(channel.enabled && channel.engaged()) {
            return None;
        }

        let Some(pose) = source.hand_pose(hand) else {
            trace!(%hand, "Hand not tracked this tick");
            return None;
        };

        // No-op unless engagement was deferred for lack of a pose.
        channel.motion.engage(pose.position);

        let motion = channel.motion.sample(pose.position, frame);
        if motion.is_empty() {
            channel.past_threshold = false;
            return None;
        }

        let repeat = channel.past_threshold;
        channel.past_threshold = true;
        if repeat && emission == EmissionMode::OncePerCrossing {
            return None;
        }

        let palm = channel.pose.sample_pose(&pose, frame);
        let gesture = Gesture::new(palm, motion, hand);
        debug!(%hand, palm = %palm, motion = %motion, "Gesture raised");
        Some(gesture)
    }
}
