//! Template matching and the dual-hand combo state machine.
//!
//! A [`GestureMatcher`] binds one [`GestureAction`] to its ordered templates.
//! Single-handed actions perform on the first matching template. Dual-handed
//! actions arm the originating hand for a window of time and perform once
//! both hands are armed.

use std::fmt;

use tracing::{debug, info, trace};

use handsign_common::clock::{secs_to_ns, TimestampNs};
use handsign_common::config::ComboSettings;
use handsign_common::error::{HandsignError, HandsignResult};
use handsign_model::action::ActionDefinition;
use handsign_model::gesture::{Gesture, GestureTemplate};
use handsign_model::hand::HandSide;

use crate::scheduler::TickScheduler;

/// The side effect bound to a set of gesture templates.
pub trait GestureAction {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Extra precondition checked before any template is considered.
    fn can_perform(&self, _gesture: &Gesture) -> bool {
        true
    }

    /// Run the action for the gesture that completed it.
    fn perform(&mut self, gesture: &Gesture);

    /// Called whenever the action stops being active.
    fn clear(&mut self) {}
}

/// Position of a matcher inside its dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub usize);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Key of a pending combo expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComboTimer {
    pub action: ActionId,
    pub hand: HandSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    Single,
    /// Both hands must match within `window_ns` of each other.
    Dual { window_ns: u64 },
}

/// Which hands have contributed to a pending combo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComboState {
    left_armed: bool,
    right_armed: bool,
}

impl ComboState {
    pub fn is_armed(&self, hand: HandSide) -> bool {
        match hand {
            HandSide::Left => self.left_armed,
            HandSide::Right => self.right_armed,
        }
    }

    fn set(&mut self, hand: HandSide, armed: bool) {
        match hand {
            HandSide::Left => self.left_armed = armed,
            HandSide::Right => self.right_armed = armed,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.left_armed && self.right_armed
    }

    pub fn is_idle(&self) -> bool {
        !(self.left_armed || self.right_armed)
    }
}

/// Why a matcher ignored an event without looking at its templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    NoTemplates,
    /// The originating hand already contributed to the pending combo.
    AlreadyArmed,
    /// [`GestureAction::can_perform`] refused the gesture.
    Refused,
}

/// Result of offering one gesture to one matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Skipped(SkipReason),
    NoMatch,
    /// The gesture armed its hand but the combo is still waiting for the other.
    Armed { template: usize },
    Performed { template: usize },
}

impl MatchOutcome {
    pub fn performed(&self) -> bool {
        matches!(self, MatchOutcome::Performed { .. })
    }
}

pub struct GestureMatcher {
    id: ActionId,
    templates: Vec<GestureTemplate>,
    mode: ActionMode,
    combo: ComboState,
    reset_on_complete: bool,
    enabled: bool,
    action: Box<dyn GestureAction>,
}

impl fmt::Debug for GestureMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureMatcher")
            .field("id", &self.id)
            .field("action", &self.action.name())
            .field("templates", &self.templates.len())
            .field("mode", &self.mode)
            .field("combo", &self.combo)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl GestureMatcher {
    pub fn new(
        action: Box<dyn GestureAction>,
        templates: Vec<GestureTemplate>,
        mode: ActionMode,
    ) -> Self {
        Self {
            id: ActionId::default(),
            templates,
            mode,
            combo: ComboState::default(),
            reset_on_complete: true,
            enabled: true,
            action,
        }
    }

    pub fn single(action: impl GestureAction + 'static, templates: Vec<GestureTemplate>) -> Self {
        Self::new(Box::new(action), templates, ActionMode::Single)
    }

    pub fn dual(
        action: impl GestureAction + 'static,
        templates: Vec<GestureTemplate>,
        window_ns: u64,
    ) -> Self {
        Self::new(Box::new(action), templates, ActionMode::Dual { window_ns })
    }

    /// Build a matcher from a serialized definition, taking the combo window
    /// and completion policy from `combo` unless the definition overrides them.
    pub fn from_definition(
        definition: &ActionDefinition,
        combo: &ComboSettings,
        action: Box<dyn GestureAction>,
    ) -> HandsignResult<Self> {
        let mode = if definition.dual {
            let window_secs = definition.window_secs.unwrap_or(combo.window_secs);
            if !(window_secs.is_finite() && window_secs > 0.0) {
                return Err(HandsignError::template(format!(
                    "action '{}' has a non-positive combo window ({window_secs})",
                    definition.name
                )));
            }
            ActionMode::Dual {
                window_ns: secs_to_ns(window_secs),
            }
        } else {
            ActionMode::Single
        };

        Ok(Self::new(action, definition.templates.clone(), mode)
            .with_reset_on_complete(combo.reset_on_complete))
    }

    /// Whether completing a combo clears both hands immediately. When false,
    /// both flags stay armed until their windows elapse.
    pub fn with_reset_on_complete(mut self, reset: bool) -> Self {
        self.reset_on_complete = reset;
        self
    }

    pub(crate) fn bind(&mut self, id: ActionId) {
        self.id = id;
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.action.name()
    }

    pub fn templates(&self) -> &[GestureTemplate] {
        &self.templates
    }

    pub fn add_template(&mut self, template: GestureTemplate) {
        self.templates.push(template);
    }

    pub fn mode(&self) -> ActionMode {
        self.mode
    }

    pub fn is_dual(&self) -> bool {
        matches!(self.mode, ActionMode::Dual { .. })
    }

    pub fn combo(&self) -> ComboState {
        self.combo
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn action(&self) -> &dyn GestureAction {
        self.action.as_ref()
    }

    /// Enable or disable the matcher. Disabling resets it.
    pub fn set_enabled(&mut self, enabled: bool, scheduler: &mut TickScheduler<ComboTimer>) {
        if self.enabled && !enabled {
            self.reset(scheduler);
        }
        self.enabled = enabled;
    }

    /// Offer one gesture event to this action.
    pub fn on_gesture_event(
        &mut self,
        gesture: &Gesture,
        now: TimestampNs,
        scheduler: &mut TickScheduler<ComboTimer>,
    ) -> MatchOutcome {
        if !self.enabled {
            return MatchOutcome::Skipped(SkipReason::Disabled);
        }
        if self.templates.is_empty() {
            return MatchOutcome::Skipped(SkipReason::NoTemplates);
        }
        if self.is_dual() && self.combo.is_armed(gesture.hand) {
            trace!(action = self.name(), hand = %gesture.hand, "Hand already armed");
            return MatchOutcome::Skipped(SkipReason::AlreadyArmed);
        }
        if !self.action.can_perform(gesture) {
            return MatchOutcome::Skipped(SkipReason::Refused);
        }

        let mut outcome = MatchOutcome::NoMatch;
        for index in 0..self.templates.len() {
            if let Some(mismatch) = self.templates[index].mismatch(gesture) {
                trace!(action = self.action.name(), template = index, ?mismatch, "Template rejected");
                continue;
            }

            match self.mode {
                ActionMode::Single => {
                    self.perform(gesture, index);
                    return MatchOutcome::Performed { template: index };
                }
                ActionMode::Dual { window_ns } => {
                    let hand = gesture.hand;
                    self.combo.set(hand, true);
                    scheduler.schedule(
                        ComboTimer {
                            action: self.id,
                            hand,
                        },
                        now.saturating_add(window_ns),
                    );
                    debug!(action = self.action.name(), %hand, template = index, "Combo hand armed");

                    if self.combo.is_complete() {
                        self.perform(gesture, index);
                        if self.reset_on_complete {
                            self.clear_combo(scheduler);
                        }
                        return MatchOutcome::Performed { template: index };
                    }
                    outcome = MatchOutcome::Armed { template: index };
                }
            }
        }
        outcome
    }

    /// The combo window for `hand` elapsed.
    pub fn expire(&mut self, hand: HandSide) {
        if self.combo.is_armed(hand) {
            debug!(action = self.name(), %hand, "Combo window elapsed");
        }
        self.combo.set(hand, false);
    }

    /// Drop any pending combo and notify the action that it is inactive.
    pub fn reset(&mut self, scheduler: &mut TickScheduler<ComboTimer>) {
        self.clear_combo(scheduler);
        self.action.clear();
    }

    fn clear_combo(&mut self, scheduler: &mut TickScheduler<ComboTimer>) {
        for hand in HandSide::BOTH {
            scheduler.cancel(ComboTimer {
                action: self.id,
                hand,
            });
        }
        self.combo = ComboState::default();
    }

    fn perform(&mut self, gesture: &Gesture, template: usize) {
        info!(
            action = self.action.name(),
            hand = %gesture.hand,
            template,
            "Action performed"
        );
        self.action.perform(gesture);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use handsign_model::hand::HandFlags;
    use handsign_model::orientation::{Orientation, OrientationSet};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Test action that records every call.
    #[derive(Clone, Default)]
    pub(crate) struct Recorder {
        pub name: String,
        pub performed: Rc<RefCell<Vec<Gesture>>>,
        pub clears: Rc<RefCell<usize>>,
        pub refuse: bool,
    }

    impl Recorder {
        pub(crate) fn named(name: &str) -> Self {
            Self {
                name: name.to_string(),
                ..Self::default()
            }
        }

        pub(crate) fn count(&self) -> usize {
            self.performed.borrow().len()
        }
    }

    impl GestureAction for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn can_perform(&self, _gesture: &Gesture) -> bool {
            !self.refuse
        }

        fn perform(&mut self, gesture: &Gesture) {
            self.performed.borrow_mut().push(*gesture);
        }

        fn clear(&mut self) {
            *self.clears.borrow_mut() += 1;
        }
    }

    const SEC: u64 = 1_000_000_000;

    fn push(hand: HandSide, motion: Orientation) -> Gesture {
        Gesture::new(
            OrientationSet::from([Orientation::Inward]),
            OrientationSet::from([motion]),
            hand,
        )
    }

    fn template(hand: impl Into<HandFlags>, motion: Orientation) -> GestureTemplate {
        GestureTemplate::new(hand, [Orientation::Inward], [motion])
    }

    #[test]
    fn test_single_first_match_wins() {
        let recorder = Recorder::named("swipe");
        let mut matcher = GestureMatcher::single(
            recorder.clone(),
            vec![
                template(HandSide::Left, Orientation::Upward),
                template(HandSide::Left, Orientation::Upward),
            ],
        );
        let mut scheduler = TickScheduler::new();

        let outcome = matcher.on_gesture_event(&push(HandSide::Left, Orientation::Upward), 0, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::Performed { template: 0 });
        assert_eq!(recorder.count(), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_hand_must_match_exactly() {
        let recorder = Recorder::named("either");
        let mut matcher = GestureMatcher::single(
            recorder.clone(),
            vec![template(HandFlags::Both, Orientation::Upward)],
        );
        let mut scheduler = TickScheduler::new();

        let outcome = matcher.on_gesture_event(&push(HandSide::Left, Orientation::Upward), 0, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::NoMatch);
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_palm_and_motion_both_required() {
        let recorder = Recorder::named("lift");
        let mut matcher = GestureMatcher::single(
            recorder.clone(),
            vec![GestureTemplate::new(
                HandSide::Right,
                [Orientation::Upward],
                [Orientation::Upward],
            )],
        );
        let mut scheduler = TickScheduler::new();

        let palm_up = Gesture::new(
            OrientationSet::from([Orientation::Inward, Orientation::Upward]),
            OrientationSet::from([Orientation::Upward, Orientation::Forward]),
            HandSide::Right,
        );
        let palm_down = Gesture::new(
            OrientationSet::from([Orientation::Downward, Orientation::Outward]),
            OrientationSet::from([Orientation::Upward]),
            HandSide::Right,
        );

        assert_eq!(matcher.on_gesture_event(&palm_down, 0, &mut scheduler), MatchOutcome::NoMatch);
        assert!(matcher.on_gesture_event(&palm_up, 0, &mut scheduler).performed());
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_refused_gesture_is_skipped() {
        let recorder = Recorder {
            refuse: true,
            ..Recorder::named("guarded")
        };
        let mut matcher = GestureMatcher::single(
            recorder.clone(),
            vec![template(HandSide::Left, Orientation::Upward)],
        );
        let mut scheduler = TickScheduler::new();
        let outcome = matcher.on_gesture_event(&push(HandSide::Left, Orientation::Upward), 0, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::Skipped(SkipReason::Refused));
        assert_eq!(recorder.count(), 0);
    }

    fn clap(recorder: &Recorder) -> GestureMatcher {
        GestureMatcher::dual(
            recorder.clone(),
            vec![
                template(HandSide::Left, Orientation::Inward),
                template(HandSide::Right, Orientation::Inward),
            ],
            SEC,
        )
    }

    #[test]
    fn test_combo_within_window() {
        let recorder = Recorder::named("clap");
        let mut matcher = clap(&recorder);
        let mut scheduler = TickScheduler::new();

        let outcome = matcher.on_gesture_event(&push(HandSide::Left, Orientation::Inward), 0, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::Armed { template: 0 });
        assert!(matcher.combo().is_armed(HandSide::Left));

        let outcome =
            matcher.on_gesture_event(&push(HandSide::Right, Orientation::Inward), SEC / 2, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::Performed { template: 1 });
        assert_eq!(recorder.count(), 1);
        assert_eq!(recorder.performed.borrow()[0].hand, HandSide::Right);

        // Completion resets both hands and their timers.
        assert!(matcher.combo().is_idle());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_combo_lingers_without_reset_on_complete() {
        let recorder = Recorder::named("clap");
        let mut matcher = clap(&recorder).with_reset_on_complete(false);
        let mut scheduler = TickScheduler::new();

        matcher.on_gesture_event(&push(HandSide::Left, Orientation::Inward), 0, &mut scheduler);
        matcher.on_gesture_event(&push(HandSide::Right, Orientation::Inward), 10, &mut scheduler);
        assert_eq!(recorder.count(), 1);
        assert!(matcher.combo().is_complete());
        assert_eq!(scheduler.len(), 2);

        // Both hands stay armed, so repeats are ignored until the windows lapse.
        let outcome = matcher.on_gesture_event(&push(HandSide::Left, Orientation::Inward), 20, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::Skipped(SkipReason::AlreadyArmed));
        assert_eq!(recorder.count(), 1);

        for timer in scheduler.expire(10 + SEC) {
            matcher.expire(timer.hand);
        }
        assert!(matcher.combo().is_idle());
    }

    #[test]
    fn test_combo_expires() {
        let recorder = Recorder::named("clap");
        let mut matcher = clap(&recorder);
        let mut scheduler = TickScheduler::new();

        matcher.on_gesture_event(&push(HandSide::Left, Orientation::Inward), 0, &mut scheduler);
        assert_eq!(
            scheduler.deadline(ComboTimer {
                action: ActionId(0),
                hand: HandSide::Left
            }),
            Some(SEC)
        );

        for timer in scheduler.expire(SEC) {
            matcher.expire(timer.hand);
        }
        assert!(!matcher.combo().is_armed(HandSide::Left));

        let outcome = matcher.on_gesture_event(&push(HandSide::Right, Orientation::Inward), SEC, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::Armed { template: 1 });
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_same_hand_cannot_complete_combo() {
        let recorder = Recorder::named("clap");
        let mut matcher = clap(&recorder);
        let mut scheduler = TickScheduler::new();

        matcher.on_gesture_event(&push(HandSide::Left, Orientation::Inward), 0, &mut scheduler);
        let outcome = matcher.on_gesture_event(&push(HandSide::Left, Orientation::Inward), 1, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::Skipped(SkipReason::AlreadyArmed));
        // The original deadline is kept.
        assert_eq!(scheduler.next_deadline(), Some(SEC));
    }

    #[test]
    fn test_combo_across_templates_in_one_event() {
        // A right gesture armed earlier, then a left gesture that matches two
        // templates completes on the first of them.
        let recorder = Recorder::named("frame");
        let mut matcher = GestureMatcher::dual(
            recorder.clone(),
            vec![
                template(HandSide::Right, Orientation::Upward),
                template(HandSide::Left, Orientation::Upward),
                template(HandSide::Left, Orientation::Upward),
            ],
            SEC,
        );
        let mut scheduler = TickScheduler::new();
        matcher.on_gesture_event(&push(HandSide::Right, Orientation::Upward), 0, &mut scheduler);
        let outcome = matcher.on_gesture_event(&push(HandSide::Left, Orientation::Upward), 5, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::Performed { template: 1 });
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_reset_clears_combo_and_action() {
        let recorder = Recorder::named("clap");
        let mut matcher = clap(&recorder);
        let mut scheduler = TickScheduler::new();
        matcher.on_gesture_event(&push(HandSide::Left, Orientation::Inward), 0, &mut scheduler);

        matcher.set_enabled(false, &mut scheduler);
        assert!(matcher.combo().is_idle());
        assert!(scheduler.is_empty());
        assert_eq!(*recorder.clears.borrow(), 1);

        let outcome = matcher.on_gesture_event(&push(HandSide::Left, Orientation::Inward), 1, &mut scheduler);
        assert_eq!(outcome, MatchOutcome::Skipped(SkipReason::Disabled));
    }

    #[test]
    fn test_from_definition() {
        let combo = ComboSettings {
            window_secs: 0.5,
            reset_on_complete: false,
        };
        let definition = ActionDefinition::dual(
            "clap",
            vec![template(HandSide::Left, Orientation::Inward)],
        );
        let matcher =
            GestureMatcher::from_definition(&definition, &combo, Box::new(Recorder::named("clap")))
                .unwrap();
        assert_eq!(matcher.mode(), ActionMode::Dual { window_ns: SEC / 2 });
        assert_eq!(matcher.name(), "clap");

        let overridden = definition.clone().with_window(2.0);
        let matcher =
            GestureMatcher::from_definition(&overridden, &combo, Box::new(Recorder::named("clap")))
                .unwrap();
        assert_eq!(matcher.mode(), ActionMode::Dual { window_ns: 2 * SEC });

        let broken = definition.with_window(0.0);
        assert!(
            GestureMatcher::from_definition(&broken, &combo, Box::new(Recorder::named("clap")))
                .is_err()
        );
    }

    fn orientation() -> impl Strategy<Value = Orientation> {
        prop::sample::select(Orientation::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_single_action_performs_at_most_once(
            motions in prop::collection::vec(orientation(), 1..6),
            incoming in orientation(),
        ) {
            let recorder = Recorder::named("any");
            let templates = motions
                .iter()
                .map(|m| template(HandSide::Left, *m))
                .collect();
            let mut matcher = GestureMatcher::single(recorder.clone(), templates);
            let mut scheduler = TickScheduler::new();

            let outcome = matcher.on_gesture_event(&push(HandSide::Left, incoming), 0, &mut scheduler);
            let expected = motions.iter().position(|m| *m == incoming);
            match expected {
                Some(index) => prop_assert_eq!(outcome, MatchOutcome::Performed { template: index }),
                None => prop_assert_eq!(outcome, MatchOutcome::NoMatch),
            }
            prop_assert!(recorder.count() <= 1);
        }
    }
}
