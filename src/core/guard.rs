//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the aggregated context. A
//! transition whose guard returns `false` does not fire; the triggering
//! event is still merged into context, just absorbed without a state change.

use super::context::AggregatedContext;
use std::sync::Arc;

/// Pure predicate that determines if a transition can fire.
///
/// Guards are evaluated against the [`AggregatedContext`] after the incoming
/// trigger has been merged. They must be deterministic functions of context
/// at evaluation time - not of trigger arrival order, wall-clock time, or any
/// other ambient state.
///
/// # Example
///
/// ```rust
/// use tunewise::core::{AggregatedContext, Guard, TrainingLossReport};
///
/// // Fires once two loss reports at epoch 1 have been recorded.
/// let guard = Guard::new(|ctx: &AggregatedContext| ctx.loss_count_at(1) >= 2);
///
/// let mut context = AggregatedContext::new();
/// assert!(!guard.check(&context));
///
/// for exp_id in ["a", "b"] {
///     context.training_loss.push(TrainingLossReport {
///         exp_id: exp_id.to_string(),
///         epoch: 1,
///         loss_name: "val_loss".to_string(),
///         loss_value: 0.5,
///     });
/// }
/// assert!(guard.check(&context));
/// ```
pub struct Guard {
    predicate: Arc<dyn Fn(&AggregatedContext) -> bool + Send + Sync>,
}

impl Guard {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be pure (deterministic, no side effects) and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&AggregatedContext) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Check if the guard allows the transition to fire.
    pub fn check(&self, context: &AggregatedContext) -> bool {
        (self.predicate)(context)
    }
}

impl Clone for Guard {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}
