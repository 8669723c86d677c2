//! gather-core
//!
//! Reconstructs minimal programs from the execution history of a cell-based
//! session (a notebook). Every execution is recorded in an append-only log,
//! annotated with statement-level def/use facts, and can later be sliced
//! backward into the smallest ordered set of statements it depends on.
//!
//! All substantive logic lives here so it is testable and reusable from
//! multiple frontends; the `cell-gather` CLI is a thin replay host.

pub mod analysis;
pub mod assembler;
pub mod history;
pub mod model;
pub mod provider;
pub mod settings;
pub mod slicer;

pub use analysis::{DataflowAnalyzer, DependencyFacts, PythonAnalyzer};
pub use assembler::{ProgramAssembler, DEFAULT_CELL_MARKER};
pub use history::{ExecutionLog, LogOutcome};
pub use model::{CellRecord, ExecutionEventId, HostCell, PersistentId};
pub use provider::GatherProvider;
pub use slicer::{ExecutionSlicer, SliceResult};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
