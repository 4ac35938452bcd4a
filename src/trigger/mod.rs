//! Typed external-event envelopes.
//!
//! Each trigger kind declares a fixed schema of named, typed fields.
//! Receiving an event validates the raw payload against that schema, records
//! it durably, and merges the validated fragment into the namespace the kind
//! owns (see [`crate::core::AggregatedContext`]).

use crate::core::{AggregatedContext, HyperparamSpec, StrategyConfig, TrainingLossReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// The declared trigger kinds a strategy can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Strategy config: `{num_exp: int, epoch: int}`.
    ReceiveRandomSearchHyperparams,
    /// Hyperparameter spec: `{learning_rate: {low, high}}`.
    ReceiveHyperparams,
    /// Loss report: `{exp_id, epoch, loss_name, loss_value}`.
    ReceiveTrainingLoss,
    /// Wall-clock tick: `{time: timestamp}`.
    ReceiveTime,
    /// Declared but unhandled by the shipped strategies.
    FailureRecovery,
}

impl TriggerKind {
    /// Stable name for logging and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceiveRandomSearchHyperparams => "ReceiveRandomSearchHyperparams",
            Self::ReceiveHyperparams => "ReceiveHyperparams",
            Self::ReceiveTrainingLoss => "ReceiveTrainingLoss",
            Self::ReceiveTime => "ReceiveTime",
            Self::FailureRecovery => "FailureRecovery",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error rejecting an inbound payload before any state mutation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A declared field is missing or fails its type check.
    #[error("invalid payload for {kind}: {reason}")]
    Payload { kind: TriggerKind, reason: String },
}

#[derive(Deserialize)]
struct TimePayload {
    time: DateTime<Utc>,
}

/// A validated external event, carrying its schema-typed payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    RandomSearchHyperparams(StrategyConfig),
    Hyperparams(HyperparamSpec),
    TrainingLoss(TrainingLossReport),
    Time(DateTime<Utc>),
    FailureRecovery,
}

impl Trigger {
    /// Validate a raw payload against the schema declared by `kind`.
    ///
    /// Fails with [`SchemaError`] when a declared field is missing or has the
    /// wrong type (a time field must be a well-formed RFC 3339 timestamp, a
    /// learning-rate range must satisfy `low <= high`). Validation happens
    /// before the event is recorded or merged; a rejected event leaves the
    /// machine untouched.
    pub fn validate(kind: TriggerKind, payload: &Value) -> Result<Self, SchemaError> {
        let reject = |err: serde_json::Error| SchemaError::Payload {
            kind,
            reason: err.to_string(),
        };
        match kind {
            TriggerKind::ReceiveRandomSearchHyperparams => {
                serde_json::from_value::<StrategyConfig>(payload.clone())
                    .map(Trigger::RandomSearchHyperparams)
                    .map_err(reject)
            }
            TriggerKind::ReceiveHyperparams => {
                let spec = serde_json::from_value::<HyperparamSpec>(payload.clone())
                    .map_err(reject)?;
                // A sampling range must be a closed interval
                let range = spec.learning_rate;
                if range.low > range.high {
                    return Err(SchemaError::Payload {
                        kind,
                        reason: format!(
                            "learning_rate range [{}, {}] has low > high",
                            range.low, range.high
                        ),
                    });
                }
                Ok(Trigger::Hyperparams(spec))
            }
            TriggerKind::ReceiveTrainingLoss => {
                serde_json::from_value::<TrainingLossReport>(payload.clone())
                    .map(Trigger::TrainingLoss)
                    .map_err(reject)
            }
            TriggerKind::ReceiveTime => serde_json::from_value::<TimePayload>(payload.clone())
                .map(|p| Trigger::Time(p.time))
                .map_err(reject),
            TriggerKind::FailureRecovery => Ok(Trigger::FailureRecovery),
        }
    }

    /// The kind whose schema this trigger was validated against.
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::RandomSearchHyperparams(_) => TriggerKind::ReceiveRandomSearchHyperparams,
            Self::Hyperparams(_) => TriggerKind::ReceiveHyperparams,
            Self::TrainingLoss(_) => TriggerKind::ReceiveTrainingLoss,
            Self::Time(_) => TriggerKind::ReceiveTime,
            Self::FailureRecovery => TriggerKind::FailureRecovery,
        }
    }

    /// Merge the validated fragment into the namespace this kind owns.
    ///
    /// Mutable namespaces are replaced wholesale; training-loss reports are
    /// appended and never removed. `FailureRecovery` owns no namespace.
    pub fn merge(&self, context: &mut AggregatedContext) {
        match self {
            Self::RandomSearchHyperparams(config) => context.strategy = Some(*config),
            Self::Hyperparams(spec) => context.hyperparams = Some(*spec),
            Self::TrainingLoss(report) => context.training_loss.push(report.clone()),
            Self::Time(time) => context.time = Some(*time),
            Self::FailureRecovery => {}
        }
    }

    /// Render the trigger back into its wire payload.
    pub fn to_payload(&self) -> Value {
        match self {
            Self::RandomSearchHyperparams(config) => json!({
                "num_exp": config.num_exp,
                "epoch": config.epoch,
            }),
            Self::Hyperparams(spec) => json!({
                "learning_rate": {
                    "low": spec.learning_rate.low,
                    "high": spec.learning_rate.high,
                },
            }),
            Self::TrainingLoss(report) => json!({
                "exp_id": report.exp_id,
                "epoch": report.epoch,
                "loss_name": report.loss_name,
                "loss_value": report.loss_value,
            }),
            Self::Time(time) => json!({ "time": time }),
            Self::FailureRecovery => json!({}),
        }
    }
}
