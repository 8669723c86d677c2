//! Core data model: cell identities, host cells, and immutable execution records.
//!
//! Two identities are tracked side by side and never conflated:
//! - `PersistentId`: the logical cell position, stable across re-execution and edits.
//! - `ExecutionEventId`: one specific run of that cell, unique within the session.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable identity of a logical cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistentId(String);

impl PersistentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersistentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one execution instance of a cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionEventId(String);

impl ExecutionEventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random event id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notebook cell type as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Code,
    Markdown,
    Raw,
}

/// Run state of a host cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    Init,
    Executing,
    #[default]
    Finished,
    Error,
}

/// A cell as the editor host sees it after a run completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCell {
    pub id: String,
    pub cell_type: CellKind,
    /// Source text. Accepts either one string or a list of line strings.
    #[serde(deserialize_with = "deserialize_source")]
    pub source: String,
    #[serde(default)]
    pub execution_count: Option<u32>,
    #[serde(default)]
    pub state: CellState,
}

impl HostCell {
    /// Convenience constructor for a finished code cell.
    pub fn code(id: impl Into<String>, source: impl Into<String>, execution_count: u32) -> Self {
        Self {
            id: id.into(),
            cell_type: CellKind::Code,
            source: source.into(),
            execution_count: Some(execution_count),
            state: CellState::Finished,
        }
    }

    pub fn with_state(mut self, state: CellState) -> Self {
        self.state = state;
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceRepr {
    Text(String),
    Lines(Vec<String>),
}

fn deserialize_source<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match SourceRepr::deserialize(deserializer)? {
        SourceRepr::Text(text) => text,
        // Notebook line lists keep their own trailing newlines.
        SourceRepr::Lines(lines) => lines.concat(),
    })
}

/// Immutable snapshot of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub persistent_id: PersistentId,
    pub execution_event_id: ExecutionEventId,
    text: String,
    pub execution_count: Option<u32>,
    pub has_error: bool,
}

impl CellRecord {
    pub fn new(
        persistent_id: PersistentId,
        execution_event_id: ExecutionEventId,
        text: impl Into<String>,
        execution_count: Option<u32>,
    ) -> Self {
        Self {
            persistent_id,
            execution_event_id,
            text: text.into(),
            execution_count,
            has_error: false,
        }
    }

    /// Convert a host cell into a record with a freshly generated event id.
    ///
    /// Returns `None` for anything that is not an executable code cell.
    pub fn from_host_cell(cell: &HostCell) -> Option<Self> {
        if cell.cell_type != CellKind::Code {
            return None;
        }
        Some(Self {
            persistent_id: PersistentId::new(cell.id.clone()),
            execution_event_id: ExecutionEventId::generate(),
            text: cell.source.clone(),
            execution_count: cell.execution_count,
            has_error: cell.state == CellState::Error,
        })
    }

    pub fn with_event_id(mut self, id: ExecutionEventId) -> Self {
        self.execution_event_id = id;
        self
    }

    pub fn with_error(mut self, has_error: bool) -> Self {
        self.has_error = has_error;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Source split into lines, without line terminators.
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }
}
