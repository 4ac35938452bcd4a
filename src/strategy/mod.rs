//! Built-in search strategies.
//!
//! Each strategy is a [`StrategyDefinition`] over the shared [`SearchState`]
//! graph. Definitions are static data: hooks close over nothing but the
//! context handed to them, so a definition can be rebuilt identically on
//! every process start and drive replay of any log it produced.
//!
//! [`StrategyDefinition`]: crate::builder::StrategyDefinition

pub mod random_search;
pub mod successive_halving;

use crate::core::State;
use serde::{Deserialize, Serialize};

/// States shared by the built-in search strategies.
///
/// Random search never enters `HalvingStage`; its graph stops at
/// `HyperparamsSet`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SearchState {
    /// Waiting for the strategy configuration.
    Init,
    /// Strategy configured; waiting for the hyperparameter spec.
    StrategyHyperparamsSet,
    /// Initial population launched; collecting loss reports.
    HyperparamsSet,
    /// Halving rounds in progress.
    HalvingStage,
    /// Search concluded; all further events are absorbed.
    End,
}

impl State for SearchState {
    fn name(&self) -> &str {
        match self {
            Self::Init => "Init",
            Self::StrategyHyperparamsSet => "StrategyHyperparamsSet",
            Self::HyperparamsSet => "HyperparamsSet",
            Self::HalvingStage => "HalvingStage",
            Self::End => "End",
        }
    }

    fn is_final(&self) -> bool {
        matches!(self, Self::End)
    }
}
