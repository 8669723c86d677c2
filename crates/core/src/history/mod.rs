//! Execution log: append-only history of cell executions for one session.
//!
//! The log owns the dataflow analyzer and runs it once per logged record, so
//! facts are always available when a slice is requested. Two indexes are kept
//! next to the records:
//! - `latest_by_persistent_id`: logical cell -> most recently logged execution.
//! - `facts_by_event_id`: execution -> its statement-level def/use facts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::{DataflowAnalyzer, DependencyFacts, PythonAnalyzer};
use crate::model::{CellRecord, ExecutionEventId, PersistentId};

/// Why a record was not appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    EmptyText,
    DuplicateEventId,
}

/// Result of `ExecutionLog::log_execution`. Rejections are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    Appended { index: usize, facts_known: bool },
    Ignored(IgnoreReason),
}

impl LogOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, LogOutcome::Appended { .. })
    }
}

/// Ordered record of every execution in a session.
///
/// Calls must be serialized by the host; a multi-threaded host should wrap the
/// log in a single mutex.
pub struct ExecutionLog {
    analyzer: Box<dyn DataflowAnalyzer>,
    records: Vec<CellRecord>,
    index_by_event_id: HashMap<ExecutionEventId, usize>,
    latest_by_persistent_id: HashMap<PersistentId, ExecutionEventId>,
    facts_by_event_id: HashMap<ExecutionEventId, DependencyFacts>,
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self::new(Box::new(PythonAnalyzer::default()))
    }
}

impl std::fmt::Debug for ExecutionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionLog")
            .field("analyzer", &self.analyzer.name())
            .field("records", &self.records.len())
            .finish()
    }
}

impl ExecutionLog {
    pub fn new(analyzer: Box<dyn DataflowAnalyzer>) -> Self {
        Self {
            analyzer,
            records: Vec::new(),
            index_by_event_id: HashMap::new(),
            latest_by_persistent_id: HashMap::new(),
            facts_by_event_id: HashMap::new(),
        }
    }

    /// Append a record and derive its facts.
    ///
    /// Blank cells and repeated event ids are ignored. An analysis failure is
    /// logged and stored as "no known dependencies"; the record is still kept.
    pub fn log_execution(&mut self, record: CellRecord) -> LogOutcome {
        if record.text().trim().is_empty() {
            debug!(cell = %record.persistent_id, "ignoring empty cell");
            return LogOutcome::Ignored(IgnoreReason::EmptyText);
        }
        if self.index_by_event_id.contains_key(&record.execution_event_id) {
            debug!(event = %record.execution_event_id, "ignoring duplicate execution event");
            return LogOutcome::Ignored(IgnoreReason::DuplicateEventId);
        }

        let (facts, facts_known) = match self.analyzer.analyze(record.text()) {
            Ok(facts) => (facts, true),
            Err(err) => {
                warn!(
                    cell = %record.persistent_id,
                    event = %record.execution_event_id,
                    analyzer = self.analyzer.name(),
                    error = %err,
                    "dataflow analysis failed; treating cell as having no dependencies"
                );
                (DependencyFacts::empty(), false)
            }
        };

        let index = self.records.len();
        let event_id = record.execution_event_id.clone();
        debug!(
            cell = %record.persistent_id,
            event = %event_id,
            execution_count = ?record.execution_count,
            statements = facts.statements.len(),
            "logged execution"
        );
        self.index_by_event_id.insert(event_id.clone(), index);
        self.latest_by_persistent_id.insert(record.persistent_id.clone(), event_id.clone());
        self.facts_by_event_id.insert(event_id, facts);
        self.records.push(record);

        LogOutcome::Appended { index, facts_known }
    }

    /// Drop all records and indexes. The analyzer is kept.
    pub fn reset(&mut self) {
        self.records.clear();
        self.index_by_event_id.clear();
        self.latest_by_persistent_id.clear();
        self.facts_by_event_id.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in execution (insertion) order.
    pub fn records(&self) -> &[CellRecord] {
        &self.records
    }

    pub fn analyzer(&self) -> &dyn DataflowAnalyzer {
        self.analyzer.as_ref()
    }

    /// Insertion index of an execution event.
    pub fn position(&self, id: &ExecutionEventId) -> Option<usize> {
        self.index_by_event_id.get(id).copied()
    }

    pub fn record(&self, id: &ExecutionEventId) -> Option<&CellRecord> {
        self.position(id).map(|i| &self.records[i])
    }

    /// Facts derived for an execution. Empty when analysis failed.
    pub fn facts(&self, id: &ExecutionEventId) -> Option<&DependencyFacts> {
        self.facts_by_event_id.get(id)
    }

    /// Most recently logged execution of a logical cell.
    pub fn latest_execution(&self, id: &PersistentId) -> Option<&CellRecord> {
        self.latest_by_persistent_id.get(id).and_then(|event| self.record(event))
    }

    /// Every execution of a logical cell, oldest first.
    pub fn executions_of(&self, id: &PersistentId) -> Vec<&CellRecord> {
        self.records.iter().filter(|r| &r.persistent_id == id).collect()
    }

    /// Log prefix ending at and including `id`, or `None` if it was never logged.
    pub fn history_up_to(&self, id: &ExecutionEventId) -> Option<&[CellRecord]> {
        self.position(id).map(|i| &self.records[..=i])
    }
}
