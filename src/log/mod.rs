//! Durable, append-only event log and its replay contract.
//!
//! The log is the machine's only persistence: an ordered sequence of
//! records from which the factory deterministically reconstructs the current
//! state and aggregated context after a crash. Appends happen only from
//! within trigger processing; there is a single writer and no further
//! locking discipline.
//!
//! Record shape per processed event: a [`LogRecord::Trigger`] is appended
//! after validation but before merge (so a crash between record and merge is
//! recoverable), and a [`LogRecord::EnterState`] follows if - and only if - a
//! transition fired, carrying the resulting state, a snapshot of the
//! strategy's working state, and the actions that were issued.

use crate::action::Action;
use crate::core::{State, WorkingState};
use crate::trigger::TriggerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub mod error;

pub use error::LogError;

/// Version identifier for the log record format.
pub const LOG_FORMAT_VERSION: u32 = 1;

/// One durable record in a strategy run's log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "", tag = "record")]
pub enum LogRecord<S: State> {
    /// Explicit fresh-start marker: the machine entered its initial state
    /// with an empty context. Carries the record format version so stale
    /// logs are rejected instead of misread.
    Init {
        version: u32,
        timestamp: DateTime<Utc>,
    },

    /// Raw receipt of a validated trigger payload, appended before merge.
    Trigger {
        kind: TriggerKind,
        payload: Value,
        timestamp: DateTime<Utc>,
    },

    /// A transition fired: the resulting state, the working-state snapshot
    /// after the pre-hook ran, and the actions issued alongside it.
    EnterState {
        state: S,
        working: WorkingState,
        actions: Vec<Action>,
        timestamp: DateTime<Utc>,
    },
}

/// Contract the core requires from its durable store.
///
/// Implementations must preserve append order and return exactly the
/// appended records from [`EventLog::records`]; replay determinism depends
/// on it.
pub trait EventLog<S: State> {
    /// Whether the log holds no records yet (fresh strategy run).
    fn is_empty(&self) -> Result<bool, LogError>;

    /// Durably append one record.
    fn append(&mut self, record: LogRecord<S>) -> Result<(), LogError>;

    /// All records, in append order, for deterministic full replay.
    fn records(&self) -> Result<Vec<LogRecord<S>>, LogError>;
}

/// In-memory log for tests and throwaway runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryLog<S: State> {
    records: Vec<LogRecord<S>>,
}

impl<S: State> MemoryLog<S> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<S: State> EventLog<S> for MemoryLog<S> {
    fn is_empty(&self) -> Result<bool, LogError> {
        Ok(self.records.is_empty())
    }

    fn append(&mut self, record: LogRecord<S>) -> Result<(), LogError> {
        self.records.push(record);
        Ok(())
    }

    fn records(&self) -> Result<Vec<LogRecord<S>>, LogError> {
        Ok(self.records.clone())
    }
}

/// File-backed log: one JSON record per line, append-only.
///
/// JSON lines keep the log human-readable and make partial writes easy to
/// spot; each append is flushed before returning.
#[derive(Clone, Debug)]
pub struct JsonFileLog {
    path: PathBuf,
}

impl JsonFileLog {
    /// Open (or lazily create) a log at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<S: State> EventLog<S> for JsonFileLog {
    fn is_empty(&self) -> Result<bool, LogError> {
        match std::fs::metadata(&self.path) {
            Ok(metadata) => Ok(metadata.len() == 0),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(err) => Err(err.into()),
        }
    }

    fn append(&mut self, record: LogRecord<S>) -> Result<(), LogError> {
        let line = serde_json::to_string(&record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }

    fn records(&self) -> Result<Vec<LogRecord<S>>, LogError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}
