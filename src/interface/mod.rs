//! Boundary abstraction between the core and the execution driver.
//!
//! The [`Interface`] translates issued actions into driver calls and turns
//! driver-reported loss uploads back into trigger events. The driver may run
//! experiments concurrently on its side; everything crossing this boundary
//! into the core is serialized into discrete, one-at-a-time trigger events.

use crate::action::Hyperparameters;
use crate::core::TrainingLossReport;
use crate::trigger::{Trigger, TriggerKind};
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the driver side of the boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriverError {
    /// An existing experiment was asked to run to a smaller budget than it
    /// already has; the recorded budget is left untouched.
    #[error("experiment <{exp_id}> cannot shrink its end epoch from {current} to {requested}")]
    InvalidEpochDecrease {
        exp_id: String,
        current: u32,
        requested: u32,
    },

    /// A loss upload arrived for an experiment that already reached its end
    /// epoch.
    #[error("experiment <{exp_id}> is already finished")]
    AlreadyFinished { exp_id: String },

    /// The operation is declared on the boundary but not implemented.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// Contract the execution driver must implement.
///
/// `run_exp` must be idempotent for an already-known experiment id: a larger
/// `end_epoch` extends the run, a smaller one is rejected with
/// [`DriverError::InvalidEpochDecrease`]. `advance` lets the driver make
/// progress - complete one more epoch for one unfinished experiment, chosen
/// arbitrarily - and hands the resulting loss report back for serialization
/// into the core.
pub trait Driver {
    fn run_exp(
        &mut self,
        exp_id: &str,
        end_epoch: u32,
        hyperparams: &Hyperparameters,
    ) -> Result<(), DriverError>;

    /// Progress one unfinished experiment by one epoch; `None` when every
    /// experiment has reached its budget.
    fn advance(&mut self) -> Result<Option<TrainingLossReport>, DriverError>;
}

/// The machine's handle on the execution driver.
pub struct Interface<D> {
    driver: D,
}

impl<D: Driver> Interface<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Ask the driver to run (or extend) an experiment.
    pub fn run_experiment(
        &mut self,
        exp_id: &str,
        end_epoch: u32,
        hyperparams: &Hyperparameters,
    ) -> Result<(), DriverError> {
        tracing::debug!(exp_id, end_epoch, resume = hyperparams.is_resume(), "run experiment");
        self.driver.run_exp(exp_id, end_epoch, hyperparams)
    }

    /// Ask the driver to kill an experiment. Always fails: cancellation is
    /// declared on the boundary but not supported.
    pub fn kill_experiment(&mut self, _exp_id: &str) -> Result<(), DriverError> {
        Err(DriverError::NotImplemented("kill_experiment"))
    }

    /// Turn a driver loss upload into the trigger event the core consumes.
    ///
    /// This is the sole producer of `ReceiveTrainingLoss` events.
    pub fn upload_training_loss(&self, report: TrainingLossReport) -> (TriggerKind, Value) {
        let trigger = Trigger::TrainingLoss(report);
        (trigger.kind(), trigger.to_payload())
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
