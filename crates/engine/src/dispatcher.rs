//! Gesture dispatch.
//!
//! The dispatcher owns every registered matcher and the combo scheduler.
//! Gestures can only be dispatched through an [`Activation`], and dropping
//! the activation resets every matcher, so no combo state outlives the
//! period in which the actions were live.

use tracing::{debug, warn};

use handsign_common::clock::TimestampNs;
use handsign_common::config::ComboSettings;
use handsign_common::error::HandsignResult;
use handsign_model::action::{ActionDefinition, ActionSet};
use handsign_model::gesture::Gesture;

use crate::matcher::{ActionId, ComboTimer, GestureAction, GestureMatcher, MatchOutcome};
use crate::scheduler::TickScheduler;

/// Outcome of dispatching one gesture to every matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub outcomes: Vec<(ActionId, MatchOutcome)>,
}

impl DispatchSummary {
    /// Actions that performed, in dispatch order.
    pub fn performed(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.performed())
            .map(|(id, _)| *id)
    }
}

#[derive(Debug)]
pub struct Dispatcher {
    matchers: Vec<GestureMatcher>,
    scheduler: TickScheduler<ComboTimer>,
    excluded: Vec<String>,
}

impl Dispatcher {
    /// Register matchers in dispatch order. Matchers without templates can
    /// never fire and are excluded with a warning.
    pub fn new(matchers: Vec<GestureMatcher>) -> Self {
        let mut registered = Vec::with_capacity(matchers.len());
        let mut excluded = Vec::new();

        for mut matcher in matchers {
            if matcher.templates().is_empty() {
                warn!(action = matcher.name(), "Action has no templates, excluding it from dispatch");
                excluded.push(matcher.name().to_string());
                continue;
            }
            matcher.bind(ActionId(registered.len()));
            registered.push(matcher);
        }

        debug!(
            registered = registered.len(),
            excluded = excluded.len(),
            "Dispatcher created"
        );

        Self {
            matchers: registered,
            scheduler: TickScheduler::new(),
            excluded,
        }
    }

    /// Build a dispatcher from serialized definitions, creating each action
    /// with `factory`.
    pub fn from_definitions<F>(
        actions: &ActionSet,
        combo: &ComboSettings,
        mut factory: F,
    ) -> HandsignResult<Self>
    where
        F: FnMut(&ActionDefinition) -> Box<dyn GestureAction>,
    {
        combo.validate()?;
        let matchers = actions
            .actions
            .iter()
            .map(|definition| GestureMatcher::from_definition(definition, combo, factory(definition)))
            .collect::<HandsignResult<Vec<_>>>()?;
        Ok(Self::new(matchers))
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn matchers(&self) -> &[GestureMatcher] {
        &self.matchers
    }

    pub fn matcher(&self, id: ActionId) -> Option<&GestureMatcher> {
        self.matchers.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<&GestureMatcher> {
        self.matchers.iter().find(|m| m.name() == name)
    }

    /// Names of actions dropped at construction.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Combo expiries still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Enable or disable an action by name. Returns false if no such action exists.
    pub fn set_action_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let Some(matcher) = self.matchers.iter_mut().find(|m| m.name() == name) else {
            return false;
        };
        matcher.set_enabled(enabled, &mut self.scheduler);
        true
    }

    /// Make the registered actions live until the returned guard is dropped.
    pub fn activate(&mut self) -> Activation<'_> {
        debug!(actions = self.matchers.len(), "Actions activated");
        Activation { dispatcher: self }
    }

    fn advance(&mut self, now: TimestampNs) -> usize {
        let due = self.scheduler.expire(now);
        for timer in &due {
            if let Some(matcher) = self.matchers.get_mut(timer.action.0) {
                matcher.expire(timer.hand);
            }
        }
        due.len()
    }

    fn dispatch(&mut self, gesture: &Gesture, now: TimestampNs) -> DispatchSummary {
        self.advance(now);

        let mut summary = DispatchSummary::default();
        for matcher in &mut self.matchers {
            let outcome = matcher.on_gesture_event(gesture, now, &mut self.scheduler);
            summary.outcomes.push((matcher.id(), outcome));
        }
        summary
    }

    fn deactivate(&mut self) {
        for matcher in &mut self.matchers {
            matcher.reset(&mut self.scheduler);
        }
        self.scheduler.clear();
        debug!("Actions deactivated");
    }
}

/// Scope during which gestures reach the registered actions.
///
/// Dropping the activation clears every action's combo state and calls
/// [`GestureAction::clear`] on each of them, on every exit path.
#[derive(Debug)]
pub struct Activation<'a> {
    dispatcher: &'a mut Dispatcher,
}

impl Activation<'_> {
    /// Forward `gesture` to every matcher in registration order. Combo
    /// windows that ended at or before `now` are expired first.
    pub fn dispatch(&mut self, gesture: &Gesture, now: TimestampNs) -> DispatchSummary {
        self.dispatcher.dispatch(gesture, now)
    }

    /// Fire combo expiries due at or before `now`. Returns how many fired.
    pub fn advance(&mut self, now: TimestampNs) -> usize {
        self.dispatcher.advance(now)
    }

    pub fn set_action_enabled(&mut self, name: &str, enabled: bool) -> bool {
        self.dispatcher.set_action_enabled(name, enabled)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        self.dispatcher
    }
}

impl Drop for Activation<'_> {
    fn drop(&mut self) {
        self.dispatcher.deactivate();
    }
}
