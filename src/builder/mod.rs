//! Builder API for declaring strategies with minimal boilerplate.
//!
//! Each strategy is a static table of guarded transitions resolved once at
//! construction; the builders here validate the table shape (every
//! transition needs a source, destination, trigger kind, and hook) before a
//! machine can be made from it.

pub mod error;
pub mod machine;
pub mod transition;

pub use error::BuildError;
pub use machine::{StrategyDefinition, StrategyDefinitionBuilder};
pub use transition::TransitionBuilder;
