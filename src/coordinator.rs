//! Serializes events from the outside world into the machine.
//!
//! The coordinator owns the three moving parts: the factory (static strategy
//! definition), the interface around the driver, and the durable log. Every
//! event is processed by a machine rebuilt from the log, so a coordinator
//! constructed over a non-empty log resumes exactly where the previous
//! process stopped.

use crate::builder::StrategyDefinition;
use crate::core::State;
use crate::interface::{Driver, DriverError, Interface};
use crate::log::EventLog;
use crate::machine::{MachineError, MachineFactory, ReplayError, StepResult, StrategyMachine};
use crate::trigger::TriggerKind;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced while coordinating events.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error(transparent)]
    Machine(#[from] MachineError),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Single-threaded control loop over one strategy, one driver, one log.
pub struct Coordinator<S: State, D: Driver, L: EventLog<S>> {
    factory: MachineFactory<S>,
    interface: Interface<D>,
    log: L,
}

impl<S: State + 'static, D: Driver, L: EventLog<S>> Coordinator<S, D, L> {
    pub fn new(definition: StrategyDefinition<S>, driver: D, log: L) -> Self {
        Self {
            factory: MachineFactory::new(definition),
            interface: Interface::new(driver),
            log,
        }
    }

    /// Feed one external event (typically a configuration trigger) into the
    /// machine.
    pub fn inject(
        &mut self,
        kind: TriggerKind,
        payload: Value,
    ) -> Result<StepResult<S>, CoordinatorError> {
        let mut machine = self.factory.build(&mut self.log)?;
        let result = machine.handle_event(kind, payload, &mut self.interface, &mut self.log)?;
        Ok(result)
    }

    /// Let the driver make progress and feed the resulting loss report back
    /// in. Returns `None` once the driver is quiescent.
    pub fn advance_time(&mut self) -> Result<Option<StepResult<S>>, CoordinatorError> {
        let Some(report) = self.interface.driver_mut().advance()? else {
            return Ok(None);
        };

        let (kind, payload) = self.interface.upload_training_loss(report);
        let mut machine = self.factory.build(&mut self.log)?;
        let result = machine.handle_event(kind, payload, &mut self.interface, &mut self.log)?;
        Ok(Some(result))
    }

    /// Rebuild and return a snapshot of the machine from the log.
    pub fn machine(&mut self) -> Result<StrategyMachine<S>, CoordinatorError> {
        Ok(self.factory.build(&mut self.log)?)
    }

    pub fn driver(&self) -> &D {
        self.interface.driver()
    }

    pub fn log(&self) -> &L {
        &self.log
    }
}
