//! Strategy machine: one-event-at-a-time trigger processing.

use crate::action::Action;
use crate::core::{AggregatedContext, State, StateHistory, StateTransition};
use crate::interface::{Driver, DriverError, Interface};
use crate::log::{EventLog, LogError, LogRecord};
use crate::machine::transition::{Transition, TransitionError};
use crate::trigger::{SchemaError, Trigger, TriggerKind};
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

/// Result of processing a single trigger event.
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult<S: State> {
    /// A transition fired; the listed actions were issued to the driver.
    Transitioned {
        from: S,
        to: S,
        actions: Vec<Action>,
    },

    /// No declared transition matched (or all guards failed); the event was
    /// merged into context but the state did not change.
    Absorbed { kind: TriggerKind },
}

/// Errors from processing one trigger event.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Log(#[from] LogError),
}

/// A strategy machine primed with a current state and aggregated context.
///
/// The machine is single-threaded and cooperative: one trigger is processed
/// to completion - validate, record, merge, guard-evaluate, hook, issue,
/// log - before the next is accepted. Construct it through
/// [`crate::machine::MachineFactory`], which either starts fresh or replays
/// the durable log.
pub struct StrategyMachine<S: State> {
    current: S,
    context: AggregatedContext,
    transitions: Vec<Transition<S>>,
    history: StateHistory<S>,
    last_trigger: Option<Trigger>,
}

impl<S: State + 'static> StrategyMachine<S> {
    pub(crate) fn from_parts(
        current: S,
        context: AggregatedContext,
        transitions: Vec<Transition<S>>,
        history: StateHistory<S>,
        last_trigger: Option<Trigger>,
    ) -> Self {
        Self {
            current,
            context,
            transitions,
            history,
            last_trigger,
        }
    }

    /// Get current state (pure)
    pub fn current_state(&self) -> &S {
        &self.current
    }

    /// Get the aggregated context (pure)
    pub fn context(&self) -> &AggregatedContext {
        &self.context
    }

    /// Check if the machine is in a final state (pure)
    pub fn is_final(&self) -> bool {
        self.current.is_final()
    }

    /// Get the transition history of this run (pure)
    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// The most recent trigger merged into context, live or replayed.
    pub fn last_trigger(&self) -> Option<&Trigger> {
        self.last_trigger.as_ref()
    }

    /// Process one trigger event to completion.
    ///
    /// The raw payload is validated against the schema of `kind` (a
    /// [`SchemaError`] leaves the machine untouched), recorded durably,
    /// merged into context, and then the declared transitions out of the
    /// current state are evaluated in declaration order. The first one whose
    /// trigger kind matches and whose guard holds fires exactly once: its
    /// hook computes actions from context, the actions are issued through
    /// the interface, and the resulting state is appended to the log.
    pub fn handle_event<D: Driver, L: EventLog<S>>(
        &mut self,
        kind: TriggerKind,
        payload: Value,
        interface: &mut Interface<D>,
        log: &mut L,
    ) -> Result<StepResult<S>, MachineError> {
        let trigger = Trigger::validate(kind, &payload)?;

        // Raw receipt goes to the log before merge; a crash here is
        // recovered by replaying the merge.
        log.append(LogRecord::Trigger {
            kind,
            payload,
            timestamp: Utc::now(),
        })?;
        trigger.merge(&mut self.context);
        self.last_trigger = Some(trigger);

        let fired = self
            .transitions
            .iter()
            .find(|t| t.matches(&self.current, kind, &self.context))
            .cloned();
        let Some(transition) = fired else {
            tracing::debug!(
                trigger = kind.name(),
                state = self.current.name(),
                "event absorbed without transition"
            );
            return Ok(StepResult::Absorbed { kind });
        };

        let actions = (transition.hook)(&mut self.context)?;
        for action in &actions {
            tracing::debug!(action = action.name(), "issuing action");
            action.issue(interface)?;
        }

        let from = std::mem::replace(&mut self.current, transition.dest.clone());
        self.history = self.history.record(StateTransition {
            from: from.clone(),
            to: self.current.clone(),
            trigger: kind,
            timestamp: Utc::now(),
        });
        log.append(LogRecord::EnterState {
            state: self.current.clone(),
            working: self.context.state,
            actions: actions.clone(),
            timestamp: Utc::now(),
        })?;
        tracing::info!(
            from = from.name(),
            to = self.current.name(),
            trigger = kind.name(),
            actions = actions.len(),
            "transition fired"
        );

        Ok(StepResult::Transitioned {
            from,
            to: self.current.clone(),
            actions,
        })
    }
}
