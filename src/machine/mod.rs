//! The replayable strategy machine and its factory.
//!
//! A machine is a plain `(state, context)` value plus a static transition
//! table. Every external event is durably recorded before it is processed,
//! so a factory can rebuild an equivalent machine after a crash by replaying
//! the ordered log: triggers are re-merged and entered states are checked
//! against the declared table, while hooks and actions are never re-run.

pub mod engine;
pub mod factory;
pub mod transition;

pub use engine::{MachineError, StepResult, StrategyMachine};
pub use factory::{MachineFactory, ReplayError};
pub use transition::{Hook, Transition, TransitionError};
