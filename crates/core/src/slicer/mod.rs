//! Backward slicing over the execution log.
//!
//! Nodes are `(execution, statement)` pairs, edges are def/use facts resolved
//! against chronological order. Starting from every statement of the target
//! execution, each read is followed back to the nearest earlier statement that
//! defines the name, until no new statements turn up.
//!
//! Chronological order is the pair `(execution ordinal, log position)`. A record
//! without an ordinal inherits the one of the nearest earlier record that has
//! one, so positions still break ties. Executions ordered after the target
//! never take part, and executions that raised an error never supply
//! definitions (they remain sliceable as targets).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::DependencyFacts;
use crate::history::ExecutionLog;
use crate::model::{CellRecord, ExecutionEventId, PersistentId};

/// Lines kept from one execution, attributed to that execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSlice {
    pub persistent_id: PersistentId,
    pub execution_event_id: ExecutionEventId,
    pub execution_count: Option<u32>,
    /// Indices of the statements kept, ascending.
    pub statements: Vec<usize>,
    /// Source lines of the kept statements, in original order.
    pub text_slice_lines: Vec<String>,
}

impl CellSlice {
    pub fn text_slice(&self) -> String {
        self.text_slice_lines.join("\n")
    }
}

/// Ordered per-execution slices; oldest execution first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceResult {
    pub target: Option<ExecutionEventId>,
    pub cell_slices: Vec<CellSlice>,
}

impl SliceResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_slices.is_empty()
    }
}

/// One execution that may contribute statements, in chronological order.
struct Candidate<'l> {
    record: &'l CellRecord,
    facts: Option<&'l DependencyFacts>,
}

/// Computes backward slices against a borrowed log.
pub struct ExecutionSlicer<'l> {
    log: &'l ExecutionLog,
}

impl<'l> ExecutionSlicer<'l> {
    pub fn new(log: &'l ExecutionLog) -> Self {
        Self { log }
    }

    /// Slice the most recent execution of a logical cell.
    pub fn slice_latest_execution(&self, id: &PersistentId) -> SliceResult {
        match self.log.latest_execution(id) {
            Some(record) => self.slice(&record.execution_event_id),
            None => {
                debug!(cell = %id, "no logged execution for cell");
                SliceResult::empty()
            }
        }
    }

    /// Every statement the target execution transitively reads from.
    ///
    /// Unknown targets yield an empty result.
    pub fn slice(&self, target: &ExecutionEventId) -> SliceResult {
        let Some(history) = self.log.history_up_to(target) else {
            debug!(event = %target, "slice requested for unknown execution");
            return SliceResult::empty();
        };

        let candidates = self.candidates(history);
        // The target sorts last: everything ordered after it was filtered out.
        let target_rank = candidates.len() - 1;
        let target_facts = candidates[target_rank].facts.filter(|f| !f.is_empty());

        let mut selected: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        match target_facts {
            Some(facts) => {
                let definitions = definition_index(&candidates);
                let mut visited: HashSet<(&ExecutionEventId, usize)> = HashSet::new();
                let mut frontier: VecDeque<(usize, usize)> = VecDeque::new();
                let target_id = &candidates[target_rank].record.execution_event_id;
                for stmt in &facts.statements {
                    visited.insert((target_id, stmt.index));
                    frontier.push_back((target_rank, stmt.index));
                }

                while let Some((rank, index)) = frontier.pop_front() {
                    selected.entry(rank).or_default().insert(index);
                    let Some(stmt) = candidates[rank].facts.and_then(|f| f.statements.get(index))
                    else {
                        continue;
                    };
                    for name in &stmt.uses {
                        let Some(defs) = definitions.get(name.as_str()) else { continue };
                        // Nearest definition strictly before this statement.
                        let before = defs.partition_point(|&site| site < (rank, index));
                        if before == 0 {
                            continue;
                        }
                        let (def_rank, def_index) = defs[before - 1];
                        let def_id = &candidates[def_rank].record.execution_event_id;
                        if visited.insert((def_id, def_index)) {
                            frontier.push_back((def_rank, def_index));
                        }
                    }
                }
            }
            None => {
                // No facts: the target stands alone, verbatim.
                selected.insert(target_rank, BTreeSet::new());
            }
        }

        let cell_slices: Vec<CellSlice> = selected
            .into_iter()
            .map(|(rank, statements)| {
                let candidate = &candidates[rank];
                let whole_cell = rank == target_rank && target_facts.is_none();
                cell_slice(candidate, statements, whole_cell)
            })
            .collect();

        debug!(
            event = %target,
            history = history.len(),
            cells = cell_slices.len(),
            "computed slice"
        );
        SliceResult { target: Some(target.clone()), cell_slices }
    }

    /// Records eligible for the slice, sorted chronologically, target last.
    fn candidates(&self, history: &'l [CellRecord]) -> Vec<Candidate<'l>> {
        let target_position = history.len() - 1;
        let mut inherited = 0u64;
        let mut keyed: Vec<((u64, usize), Candidate<'l>)> = Vec::with_capacity(history.len());
        for (position, record) in history.iter().enumerate() {
            if let Some(count) = record.execution_count {
                inherited = u64::from(count);
            }
            keyed.push((
                (inherited, position),
                Candidate { record, facts: self.log.facts(&record.execution_event_id) },
            ));
        }

        let target_key = keyed[target_position].0;
        let mut kept: Vec<((u64, usize), Candidate<'l>)> = keyed
            .into_iter()
            .filter(|(key, _)| key.1 == target_position || *key < target_key)
            .collect();
        kept.sort_by_key(|(key, _)| *key);
        kept.into_iter().map(|(_, candidate)| candidate).collect()
    }
}

/// Name -> definition sites `(rank, statement)`, ascending.
fn definition_index<'c>(candidates: &'c [Candidate<'_>]) -> HashMap<&'c str, Vec<(usize, usize)>> {
    let target_rank = candidates.len() - 1;
    let mut index: HashMap<&str, Vec<(usize, usize)>> = HashMap::new();
    for (rank, candidate) in candidates.iter().enumerate() {
        if candidate.record.has_error && rank != target_rank {
            continue;
        }
        let Some(facts) = candidate.facts else { continue };
        for stmt in &facts.statements {
            for name in &stmt.defs {
                index.entry(name.as_str()).or_default().push((rank, stmt.index));
            }
        }
    }
    index
}

fn cell_slice(candidate: &Candidate<'_>, statements: BTreeSet<usize>, whole_cell: bool) -> CellSlice {
    let record = candidate.record;
    let lines = record.lines();
    let text_slice_lines: Vec<String> = if whole_cell {
        lines.iter().map(|l| l.to_string()).collect()
    } else {
        let mut wanted = BTreeSet::new();
        if let Some(facts) = candidate.facts {
            for index in &statements {
                if let Some(stmt) = facts.statements.get(*index) {
                    wanted.extend(stmt.lines());
                }
            }
        }
        wanted.into_iter().filter_map(|n| lines.get(n).map(|l| l.to_string())).collect()
    };

    CellSlice {
        persistent_id: record.persistent_id.clone(),
        execution_event_id: record.execution_event_id.clone(),
        execution_count: record.execution_count,
        statements: statements.into_iter().collect(),
        text_slice_lines,
    }
}
