//! Core State trait for strategy-declared state sets.
//!
//! Every search strategy declares a finite set of states; exactly one is
//! current at any time. States are pure values with no behavior beyond
//! inspection.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for strategy machine states.
///
/// All methods are pure - no side effects. States represent immutable
/// values that describe the current position in a strategy's state graph.
///
/// # Required Traits
///
/// - `Clone`: States must be cloneable for history tracking
/// - `PartialEq`: States must be comparable for transition matching
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States appear in durable log records
///
/// # Example
///
/// ```rust
/// use tunewise::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum SweepState {
///     Init,
///     Launched,
///     Done,
/// }
///
/// impl State for SweepState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Init => "Init",
///             Self::Launched => "Launched",
///             Self::Done => "Done",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Done)
///     }
/// }
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// A machine in a final state absorbs all further events without
    /// transitioning.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
