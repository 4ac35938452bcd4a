//! Tunewise: a crash-recoverable hyperparameter-search control loop.
//!
//! A search strategy is declared as a persistent, replayable state machine:
//! typed triggers merge into an aggregated context, guarded transitions fire
//! in declaration order, and pre-transition hooks compute the `RunExp`
//! actions issued to an execution driver through the [`Interface`] boundary.
//! Every trigger and every entered state is appended to a durable event log
//! before processing continues, so a crashed process resumes by rebuilding
//! the machine from the log - no hook is re-run and no action is re-issued.
//!
//! # Core Concepts
//!
//! - **Trigger**: A validated external event, merged into one namespace of
//!   the [`AggregatedContext`]
//! - **Guard**: A pure predicate over the merged context that gates a
//!   transition
//! - **Action**: A typed command the machine issues to the driver
//! - **Strategy**: A static transition table built with the fluent builders
//!   in [`builder`]
//!
//! # Example
//!
//! ```rust
//! use tunewise::coordinator::Coordinator;
//! use tunewise::driver::{DemoDriver, QuadraticLogLoss};
//! use tunewise::log::MemoryLog;
//! use tunewise::strategy::{successive_halving, SearchState};
//! use tunewise::trigger::TriggerKind;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = successive_halving::definition()?;
//! let mut coordinator = Coordinator::new(
//!     definition,
//!     DemoDriver::new(QuadraticLogLoss),
//!     MemoryLog::<SearchState>::new(),
//! );
//!
//! coordinator.inject(
//!     TriggerKind::ReceiveRandomSearchHyperparams,
//!     json!({ "num_exp": 4, "epoch": 1 }),
//! )?;
//! coordinator.inject(
//!     TriggerKind::ReceiveHyperparams,
//!     json!({ "learning_rate": { "low": 1e-4, "high": 1e-1 } }),
//! )?;
//!
//! // Drive the demo training loop until the search concludes.
//! while coordinator.advance_time()?.is_some() {}
//!
//! assert_eq!(coordinator.machine()?.current_state(), &SearchState::End);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod builder;
pub mod coordinator;
pub mod core;
pub mod driver;
pub mod interface;
pub mod log;
pub mod machine;
pub mod strategy;
pub mod trigger;

// Re-export commonly used types
pub use action::{Action, Hyperparameters};
pub use builder::{BuildError, StrategyDefinition, StrategyDefinitionBuilder, TransitionBuilder};
pub use coordinator::{Coordinator, CoordinatorError};
pub use core::{AggregatedContext, Guard, State, StateHistory, StateTransition};
pub use interface::{Driver, DriverError, Interface};
pub use log::{EventLog, JsonFileLog, LogRecord, MemoryLog};
pub use machine::{MachineError, MachineFactory, ReplayError, StepResult, StrategyMachine};
pub use trigger::{SchemaError, Trigger, TriggerKind};
