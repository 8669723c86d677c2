//! Dataflow analysis: per-statement def/use facts for a single cell.
//!
//! The analyzer is a pure function of the cell text. It splits the cell into
//! top-level statements, and records for each one the names it defines and the
//! names it reads. Slicing across cells is done later by `slicer`, which only
//! needs these facts plus the line range each statement occupies.

mod magics;
mod python;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use magics::comment_out_magics;
pub use python::PythonAnalyzer;

/// Def/use facts for one top-level statement of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementFacts {
    /// Position of the statement within its cell (0-based).
    pub index: usize,
    /// First source line of the statement (0-based).
    pub start_line: usize,
    /// Last source line of the statement (0-based, inclusive).
    pub end_line: usize,
    pub defs: BTreeSet<String>,
    pub uses: BTreeSet<String>,
}

impl StatementFacts {
    pub fn defines(&self, name: &str) -> bool {
        self.defs.contains(name)
    }

    pub fn lines(&self) -> std::ops::RangeInclusive<usize> {
        self.start_line..=self.end_line
    }
}

/// Directed def -> use edge between two statements of the same cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: usize,
    pub to: usize,
    pub name: String,
}

/// All facts derived from one cell's text.
///
/// An empty fact set means "no dependencies known", which is also what an
/// unparseable cell degrades to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFacts {
    pub statements: Vec<StatementFacts>,
}

impl DependencyFacts {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Every name defined anywhere in the cell.
    pub fn defined_names(&self) -> BTreeSet<&str> {
        self.statements.iter().flat_map(|s| s.defs.iter().map(String::as_str)).collect()
    }

    /// Intra-cell edges from each read to the nearest earlier statement defining it.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges = Vec::new();
        for (to, stmt) in self.statements.iter().enumerate() {
            for name in &stmt.uses {
                if let Some(from) = self.statements[..to].iter().rposition(|s| s.defines(name)) {
                    edges.push(DependencyEdge { from, to, name: name.clone() });
                }
            }
        }
        edges.sort();
        edges
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to load grammar: {0}")]
    Language(String),
    #[error("Parser returned no syntax tree")]
    ParseAborted,
    #[error("Syntax error near line {line}")]
    Syntax { line: usize },
}

/// Derives statement-level def/use facts from cell source.
///
/// Implementations must be pure: the same text always yields the same facts.
pub trait DataflowAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<DependencyFacts, AnalysisError>;

    /// Human-readable name used in log output.
    fn name(&self) -> &'static str;
}
