//! State transition history tracking.
//!
//! Provides immutable tracking of fired transitions over one strategy run.
//! The history is an in-memory view; on resume it is rebuilt from the
//! durable log during replay.

use super::state::State;
use crate::trigger::TriggerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of a single fired transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// The trigger kind whose event fired the transition
    pub trigger: TriggerKind,
    /// When the transition fired
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of fired transitions.
///
/// History is immutable - `record` returns a new history with the transition
/// added, leaving the original untouched.
///
/// # Example
///
/// ```rust
/// use tunewise::core::{State, StateHistory, StateTransition};
/// use tunewise::strategy::SearchState;
/// use tunewise::trigger::TriggerKind;
/// use chrono::Utc;
///
/// let history = StateHistory::new();
/// let history = history.record(StateTransition {
///     from: SearchState::Init,
///     to: SearchState::StrategyHyperparamsSet,
///     trigger: TriggerKind::ReceiveRandomSearchHyperparams,
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 2); // Init -> StrategyHyperparamsSet
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: the first transition's source,
    /// then the destination of each fired transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Get all recorded transitions in order.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}
