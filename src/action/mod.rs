//! Typed external-command envelopes.
//!
//! Actions are computed by pre-transition hooks and issued against the
//! [`Interface`] as the machine's only side effect. Issuance is recorded in
//! the durable log at the same point the state transition is recorded, so
//! replay never re-issues a historical action to the driver.

use crate::interface::{Driver, DriverError, Interface};
use serde::{Deserialize, Serialize};

/// Hyperparameter bindings carried by a run command.
///
/// An unset `learning_rate` means "continue with unchanged hyperparameters";
/// it is how a survivor is resumed after a halving round without resampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_decay: Option<f64>,
}

impl Hyperparameters {
    /// Bindings for a fresh launch with a sampled learning rate.
    pub fn fresh(learning_rate: f64) -> Self {
        Self {
            learning_rate: Some(learning_rate),
            weight_decay: None,
        }
    }

    /// Bindings for resuming a survivor: everything unset, nothing resampled.
    pub fn resume() -> Self {
        Self::default()
    }

    /// Whether this is a continuation rather than a fresh launch.
    pub fn is_resume(&self) -> bool {
        self.learning_rate.is_none()
    }
}

/// A command the machine emits to the execution driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Run (or extend) a training experiment up to `end_epoch`.
    RunExp {
        exp_id: String,
        end_epoch: u32,
        hyperparams: Hyperparameters,
    },
    /// Kill an in-flight experiment. Declared but not implemented; issuing
    /// it always fails.
    KillExp { exp_id: String },
}

impl Action {
    /// Stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunExp { .. } => "RunExp",
            Self::KillExp { .. } => "KillExp",
        }
    }

    /// Perform exactly one driver call with this action's payload.
    pub fn issue<D: Driver>(&self, interface: &mut Interface<D>) -> Result<(), DriverError> {
        match self {
            Self::RunExp {
                exp_id,
                end_epoch,
                hyperparams,
            } => interface.run_experiment(exp_id, *end_epoch, hyperparams),
            Self::KillExp { exp_id } => interface.kill_experiment(exp_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_bindings_are_unset() {
        let hyperparams = Hyperparameters::resume();
        assert!(hyperparams.is_resume());
        assert!(hyperparams.learning_rate.is_none());
        assert!(hyperparams.weight_decay.is_none());
    }

    #[test]
    fn fresh_bindings_carry_the_sampled_rate() {
        let hyperparams = Hyperparameters::fresh(0.01);
        assert!(!hyperparams.is_resume());
        assert_eq!(hyperparams.learning_rate, Some(0.01));
    }

    #[test]
    fn unset_fields_are_omitted_from_the_wire() {
        let json = serde_json::to_string(&Hyperparameters::resume()).unwrap();
        assert_eq!(json, "{}");

        let json = serde_json::to_string(&Hyperparameters::fresh(0.5)).unwrap();
        assert_eq!(json, r#"{"learning_rate":0.5}"#);
    }

    #[test]
    fn action_roundtrips_through_json() {
        let action = Action::RunExp {
            exp_id: "exp-1".to_string(),
            end_epoch: 2,
            hyperparams: Hyperparameters::fresh(0.01),
        };

        let json = serde_json::to_string(&action).unwrap();
        let deserialized: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, deserialized);
    }
}
