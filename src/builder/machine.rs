//! Builder for declaring complete strategy definitions.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::State;
use crate::machine::Transition;

/// The static state graph of one search strategy: its initial state and the
/// declared transitions, in declaration order.
///
/// Built once at construction time; the machine never resolves transitions
/// by name at runtime.
pub struct StrategyDefinition<S: State> {
    initial: S,
    transitions: Vec<Transition<S>>,
}

impl<S: State> StrategyDefinition<S> {
    /// The sole initial state.
    pub fn initial(&self) -> &S {
        &self.initial
    }

    /// Declared transitions, in declaration order. The first transition out
    /// of the current state whose trigger kind matches and whose guard holds
    /// is the one that fires.
    pub fn transitions(&self) -> &[Transition<S>] {
        &self.transitions
    }
}

/// Builder for constructing strategy definitions with a fluent API.
pub struct StrategyDefinitionBuilder<S: State> {
    initial: Option<S>,
    transitions: Vec<Transition<S>>,
}

impl<S: State> StrategyDefinitionBuilder<S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            transitions: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Build the strategy definition.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<StrategyDefinition<S>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        Ok(StrategyDefinition {
            initial,
            transitions: self.transitions,
        })
    }
}

impl<S: State> Default for StrategyDefinitionBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
