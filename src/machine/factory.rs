//! Machine construction: fresh start or deterministic replay.

use crate::builder::StrategyDefinition;
use crate::core::{AggregatedContext, State, StateHistory, StateTransition};
use crate::log::{EventLog, LogError, LogRecord, LOG_FORMAT_VERSION};
use crate::machine::engine::StrategyMachine;
use crate::trigger::{SchemaError, Trigger, TriggerKind};
use chrono::Utc;
use thiserror::Error;

/// Fatal errors reconstructing a machine from the durable log.
///
/// Replay errors abort construction: silently continuing would diverge the
/// machine's state from its history.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A logged state has no matching declared transition in the current
    /// strategy definition (e.g., the transition table changed between runs).
    #[error(
        "logged state `{entered}` is not reachable from `{from}` on {trigger} \
         in the current strategy definition"
    )]
    Inconsistency {
        from: String,
        entered: String,
        trigger: String,
    },

    /// A logged payload no longer validates against its trigger schema.
    #[error("logged {kind} payload failed re-validation")]
    Corrupt {
        kind: TriggerKind,
        #[source]
        source: SchemaError,
    },

    /// The log holds records but does not begin with the fresh-start marker.
    #[error("log does not begin with an init marker")]
    MissingInit,

    /// The log was written by an incompatible record format.
    #[error("log format version {found} is not supported (expected {LOG_FORMAT_VERSION})")]
    UnsupportedVersion { found: u32 },

    #[error(transparent)]
    Log(#[from] LogError),
}

/// Constructs strategy machines, either fresh or replayed.
///
/// Holds the strategy's static transition table; every build attaches a
/// clone of that table to a plain `(state, context)` value - freshly
/// initialized, or reconstructed from the log. No actions are ever re-issued
/// during replay: the log reconstructs the machine's bookkeeping, not driver
/// side effects.
pub struct MachineFactory<S: State> {
    definition: StrategyDefinition<S>,
}

impl<S: State + 'static> MachineFactory<S> {
    pub fn new(definition: StrategyDefinition<S>) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &StrategyDefinition<S> {
        &self.definition
    }

    /// Build a machine primed to accept the next live trigger.
    ///
    /// An empty log yields a machine at the initial state with an empty
    /// context, and the fresh start itself is durably recorded with an
    /// explicit init marker. Otherwise the ordered log is replayed.
    pub fn build<L: EventLog<S>>(&self, log: &mut L) -> Result<StrategyMachine<S>, ReplayError> {
        if log.is_empty()? {
            log.append(LogRecord::Init {
                version: LOG_FORMAT_VERSION,
                timestamp: Utc::now(),
            })?;
            tracing::info!(state = self.definition.initial().name(), "fresh start");
            return Ok(StrategyMachine::from_parts(
                self.definition.initial().clone(),
                AggregatedContext::new(),
                self.definition.transitions().to_vec(),
                StateHistory::new(),
                None,
            ));
        }

        self.replay(&log.records()?)
    }

    /// Deterministically reconstruct `(state, context, history)` from the
    /// ordered records and attach them to a new machine.
    fn replay(&self, records: &[LogRecord<S>]) -> Result<StrategyMachine<S>, ReplayError> {
        let mut records = records.iter();
        match records.next() {
            Some(LogRecord::Init { version, .. }) => {
                if *version != LOG_FORMAT_VERSION {
                    return Err(ReplayError::UnsupportedVersion { found: *version });
                }
            }
            _ => return Err(ReplayError::MissingInit),
        }

        let mut current = self.definition.initial().clone();
        let mut context = AggregatedContext::new();
        let mut history = StateHistory::new();
        let mut last_trigger: Option<Trigger> = None;

        for record in records {
            match record {
                LogRecord::Init { .. } => {
                    tracing::warn!("duplicate init marker in log, ignoring");
                }
                LogRecord::Trigger { kind, payload, .. } => {
                    let trigger = Trigger::validate(*kind, payload).map_err(|source| {
                        ReplayError::Corrupt {
                            kind: *kind,
                            source,
                        }
                    })?;
                    trigger.merge(&mut context);
                    last_trigger = Some(trigger);
                }
                LogRecord::EnterState {
                    state: entered,
                    working,
                    timestamp,
                    ..
                } => {
                    let kind = last_trigger.as_ref().map(Trigger::kind);
                    let declared = kind.is_some_and(|k| {
                        self.definition.transitions().iter().any(|t| {
                            t.source == current && t.trigger == k && t.dest == *entered
                        })
                    });
                    if !declared {
                        return Err(ReplayError::Inconsistency {
                            from: current.name().to_string(),
                            entered: entered.name().to_string(),
                            trigger: kind
                                .map(|k| k.name().to_string())
                                .unwrap_or_else(|| "<none>".to_string()),
                        });
                    }

                    // The snapshot restores the hook-owned working state
                    // without re-running hooks or re-issuing actions.
                    context.state = *working;
                    if let Some(k) = kind {
                        history = history.record(StateTransition {
                            from: current.clone(),
                            to: entered.clone(),
                            trigger: k,
                            timestamp: *timestamp,
                        });
                    }
                    current = entered.clone();
                }
            }
        }

        tracing::info!(
            state = current.name(),
            transitions = history.transitions().len(),
            loss_reports = context.training_loss.len(),
            "machine reconstructed from log"
        );
        Ok(StrategyMachine::from_parts(
            current,
            context,
            self.definition.transitions().to_vec(),
            history,
            last_trigger,
        ))
    }
}
