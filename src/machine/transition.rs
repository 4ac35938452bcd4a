//! Declared transitions and their pre-hooks.

use crate::action::Action;
use crate::core::{AggregatedContext, Guard, State};
use crate::trigger::TriggerKind;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a pre-transition hook.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The hook needs a namespace no trigger has populated yet.
    #[error("hook requires the `{0}` namespace, which has not been set")]
    IncompleteContext(&'static str),
}

/// Type alias for pre-transition hooks.
///
/// A hook runs after the triggering event has merged and the guard has
/// passed. It may mutate the strategy's working state and returns the
/// actions to issue through the interface.
pub type Hook =
    Arc<dyn Fn(&mut AggregatedContext) -> Result<Vec<Action>, TransitionError> + Send + Sync>;

/// A declared transition: source, destination, subscribing trigger kind, an
/// optional guard, and the pre-hook.
pub struct Transition<S: State> {
    pub source: S,
    pub dest: S,
    pub trigger: TriggerKind,
    pub guard: Option<Guard>,
    pub hook: Hook,
}

impl<S: State> Transition<S> {
    /// Check whether this transition fires for an event of `kind` arriving
    /// while the machine sits in `current` (pure).
    pub fn matches(&self, current: &S, kind: TriggerKind, context: &AggregatedContext) -> bool {
        if *current != self.source || kind != self.trigger {
            return false;
        }

        // Guard, if present, is a pure predicate over merged context
        self.guard.as_ref().is_none_or(|g| g.check(context))
    }
}

impl<S: State> Clone for Transition<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            dest: self.dest.clone(),
            trigger: self.trigger,
            guard: self.guard.clone(),
            hook: Arc::clone(&self.hook),
        }
    }
}
