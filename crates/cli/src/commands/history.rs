use std::path::Path;

use anyhow::Result;
use gather_core::analysis::DependencyFacts;
use gather_core::model::{ExecutionEventId, PersistentId};
use gather_core::settings::GatherSettings;
use serde::Serialize;

use crate::commands::{load_transcript, replay_transcript};

/// List every execution that made it into the log.
pub fn history_command(session: &str, json: bool) -> Result<()> {
    let transcript = load_transcript(Path::new(session))?;
    let provider = replay_transcript(&transcript, GatherSettings::default());
    let records = provider.execution_log().records();

    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!("Executions:");
    if records.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for record in records {
        let count = record.execution_count.map_or_else(|| "-".to_string(), |c| c.to_string());
        let error = if record.has_error { " [error]" } else { "" };
        println!(
            "- [{count}] {} ({}){error}",
            record.persistent_id, record.execution_event_id
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ExecutionFacts<'a> {
    persistent_id: &'a PersistentId,
    execution_event_id: &'a ExecutionEventId,
    facts: &'a DependencyFacts,
}

/// Show the def/use facts derived for each logged execution.
pub fn facts_command(session: &str, json: bool) -> Result<()> {
    let transcript = load_transcript(Path::new(session))?;
    let provider = replay_transcript(&transcript, GatherSettings::default());
    let log = provider.execution_log();
    let empty = DependencyFacts::empty();

    let entries: Vec<ExecutionFacts> = log
        .records()
        .iter()
        .map(|record| ExecutionFacts {
            persistent_id: &record.persistent_id,
            execution_event_id: &record.execution_event_id,
            facts: log.facts(&record.execution_event_id).unwrap_or(&empty),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in entries {
        println!("{} ({}):", entry.persistent_id, entry.execution_event_id);
        if entry.facts.is_empty() {
            println!("  (no known dependencies)");
            continue;
        }
        let defined: Vec<&str> = entry.facts.defined_names().into_iter().collect();
        println!("  defines [{}]", defined.join(", "));
        for stmt in &entry.facts.statements {
            let defs: Vec<&str> = stmt.defs.iter().map(String::as_str).collect();
            let uses: Vec<&str> = stmt.uses.iter().map(String::as_str).collect();
            println!(
                "  #{} lines {}-{}: defs [{}] uses [{}]",
                stmt.index,
                stmt.start_line + 1,
                stmt.end_line + 1,
                defs.join(", "),
                uses.join(", ")
            );
        }
    }
    Ok(())
}
