//! Builder for declaring guarded transitions.

use crate::action::Action;
use crate::builder::error::BuildError;
use crate::core::{AggregatedContext, Guard, State};
use crate::machine::{Hook, Transition, TransitionError};
use crate::trigger::TriggerKind;
use std::sync::Arc;

/// Builder for declaring transitions with a fluent API.
///
/// A transition is `(source state, dest state, trigger kind, guard, hook)`.
/// The guard is optional; source, destination, trigger kind, and hook are
/// required.
pub struct TransitionBuilder<S: State> {
    source: Option<S>,
    dest: Option<S>,
    trigger: Option<TriggerKind>,
    guard: Option<Guard>,
    hook: Option<Hook>,
}

impl<S: State> TransitionBuilder<S> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            source: None,
            dest: None,
            trigger: None,
            guard: None,
            hook: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.source = Some(state);
        self
    }

    /// Set the destination state (required).
    pub fn to(mut self, state: S) -> Self {
        self.dest = Some(state);
        self
    }

    /// Set the trigger kind whose events this transition listens to
    /// (required).
    pub fn on(mut self, trigger: TriggerKind) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Add a guard predicate (optional).
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AggregatedContext) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Set the pre-transition hook (required).
    ///
    /// The hook runs after the trigger has merged and the guard has passed;
    /// it may mutate the strategy's working state and returns the actions to
    /// issue.
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut AggregatedContext) -> Result<Vec<Action>, TransitionError>
            + Send
            + Sync
            + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Set a hook that mutates nothing and issues no actions.
    pub fn no_op(self) -> Self {
        self.hook(|_ctx| Ok(Vec::new()))
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S>, BuildError> {
        let source = self.source.ok_or(BuildError::MissingSourceState)?;
        let dest = self.dest.ok_or(BuildError::MissingDestState)?;
        let trigger = self.trigger.ok_or(BuildError::MissingTriggerKind)?;
        let hook = self.hook.ok_or(BuildError::MissingHook)?;

        Ok(Transition {
            source,
            dest,
            trigger,
            guard: self.guard,
            hook,
        })
    }
}

impl<S: State> Default for TransitionBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Init,
        Launched,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Init => "Init",
                Self::Launched => "Launched",
            }
        }
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = TransitionBuilder::<TestState>::new()
            .from(TestState::Init)
            .build();

        assert!(matches!(result, Err(BuildError::MissingDestState)));
    }

    #[test]
    fn builder_validates_missing_trigger() {
        let result = TransitionBuilder::new()
            .from(TestState::Init)
            .to(TestState::Launched)
            .no_op()
            .build();

        assert!(matches!(result, Err(BuildError::MissingTriggerKind)));
    }

    #[test]
    fn builder_validates_missing_hook() {
        let result = TransitionBuilder::new()
            .from(TestState::Init)
            .to(TestState::Launched)
            .on(TriggerKind::ReceiveHyperparams)
            .build();

        assert!(matches!(result, Err(BuildError::MissingHook)));
    }

    #[test]
    fn fluent_api_builds_transition() {
        let transition = TransitionBuilder::new()
            .from(TestState::Init)
            .to(TestState::Launched)
            .on(TriggerKind::ReceiveHyperparams)
            .when(|ctx| ctx.hyperparams.is_some())
            .no_op()
            .build()
            .unwrap();

        assert_eq!(transition.source, TestState::Init);
        assert_eq!(transition.dest, TestState::Launched);
        assert_eq!(transition.trigger, TriggerKind::ReceiveHyperparams);
        assert!(transition.guard.is_some());
    }

    #[test]
    fn guarded_transition_only_matches_when_guard_holds() {
        let transition = TransitionBuilder::new()
            .from(TestState::Init)
            .to(TestState::Launched)
            .on(TriggerKind::ReceiveHyperparams)
            .when(|ctx| !ctx.training_loss.is_empty())
            .no_op()
            .build()
            .unwrap();

        let context = AggregatedContext::new();
        assert!(!transition.matches(&TestState::Init, TriggerKind::ReceiveHyperparams, &context));
    }
}
