//! Aggregated trigger context and its fixed namespaces.
//!
//! Every validated trigger merges its payload into one namespace of the
//! [`AggregatedContext`]. Namespaces never share keys; only the training-loss
//! namespace grows monotonically, all others are overwritten wholesale by the
//! trigger kind that owns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static strategy configuration (the `strategy` namespace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Number of experiment slots in the initial population.
    pub num_exp: u32,
    /// Baseline epoch used for loss counting and ranking.
    pub epoch: u32,
}

/// Closed interval a hyperparameter is sampled from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub low: f64,
    pub high: f64,
}

/// Per-run hyperparameter bindings (the `hyperparams` namespace).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HyperparamSpec {
    /// Range fresh learning rates are drawn from, uniformly at random.
    pub learning_rate: ParamRange,
}

/// A single epoch-level loss report from the driver.
///
/// Reports are immutable once recorded and never removed. Uniqueness of
/// `(exp_id, epoch)` is not enforced; duplicates are appended and counted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingLossReport {
    pub exp_id: String,
    pub epoch: u32,
    pub loss_name: String,
    pub loss_value: f64,
}

/// Strategy-private working variables (the `state` namespace).
///
/// Owned exclusively by the active strategy's hooks; mutated only within one
/// trigger-processing call and snapshotted into the durable log afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingState {
    /// Surviving population size for the current round.
    pub num_exp: u32,
    /// Epoch-budget counter, doubled on every halving round.
    pub num_epochs: u32,
    /// Target epoch the current round's survivors train towards.
    pub total_num_epochs: u32,
}

/// Namespaced aggregation of everything the triggers have delivered so far.
///
/// Guards are pure functions of this value at evaluation time; nothing about
/// trigger arrival order is observable beyond what the log already captures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedContext {
    pub strategy: Option<StrategyConfig>,
    pub hyperparams: Option<HyperparamSpec>,
    pub training_loss: Vec<TrainingLossReport>,
    pub state: WorkingState,
    pub time: Option<DateTime<Utc>>,
}

impl AggregatedContext {
    /// Create an empty context, as held by a freshly started machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of recorded loss reports at `epoch`.
    ///
    /// Duplicate reports for the same experiment are counted individually; a
    /// misbehaving driver can therefore inflate this count.
    pub fn loss_count_at(&self, epoch: u32) -> usize {
        self.training_loss
            .iter()
            .filter(|report| report.epoch == epoch)
            .count()
    }

    /// Ids of the `num` lowest-loss experiments at `epoch`, ascending.
    ///
    /// The sort is stable: among equal losses, the first-recorded report
    /// wins. Returns fewer than `num` ids when fewer reports exist.
    pub fn top_experiments(&self, num: usize, epoch: u32) -> Vec<String> {
        let mut ranked: Vec<&TrainingLossReport> = self
            .training_loss
            .iter()
            .filter(|report| report.epoch == epoch)
            .collect();
        ranked.sort_by(|a, b| a.loss_value.total_cmp(&b.loss_value));
        ranked
            .into_iter()
            .take(num)
            .map(|report| report.exp_id.clone())
            .collect()
    }
}
