//! Core state machine types and logic.
//!
//! This module contains the pure functional core of the strategy machine:
//! - State definitions via the `State` trait
//! - Guard predicates over aggregated trigger context
//! - The namespaced `AggregatedContext` and its query helpers
//! - Immutable history tracking
//!
//! All logic in this module is pure (no side effects); the imperative shell
//! lives in `machine`, `interface`, and `coordinator`.

mod context;
mod guard;
mod history;
mod state;

pub use context::{
    AggregatedContext, HyperparamSpec, ParamRange, StrategyConfig, TrainingLossReport,
    WorkingState,
};
pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::State;
