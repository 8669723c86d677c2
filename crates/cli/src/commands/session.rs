use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gather_core::history::LogOutcome;
use gather_core::model::{CellRecord, ExecutionEventId, HostCell};
use gather_core::provider::GatherProvider;
use gather_core::settings::GatherSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One recorded cell run. The event id is optional; a fresh one is generated
/// when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(flatten)]
    pub cell: HostCell,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_event_id: Option<ExecutionEventId>,
}

/// Cell runs of a session, in the order they finished.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTranscript {
    #[serde(default)]
    pub cells: Vec<TranscriptEntry>,
}

/// Load a transcript from JSON or YAML, chosen by file extension.
pub fn load_transcript(path: &Path) -> Result<SessionTranscript> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session transcript at {}", path.display()))?;
    let is_yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"));
    let transcript = if is_yaml {
        serde_yaml::from_str(&contents).context("Failed to parse session transcript YAML")?
    } else {
        serde_json::from_str(&contents).context("Failed to parse session transcript JSON")?
    };
    Ok(transcript)
}

/// Feed every transcript entry through a fresh provider, as a host would.
pub fn replay_transcript(transcript: &SessionTranscript, settings: GatherSettings) -> GatherProvider {
    let mut provider = GatherProvider::new(settings);
    for entry in &transcript.cells {
        let Some(record) = CellRecord::from_host_cell(&entry.cell) else {
            debug!(cell = %entry.cell.id, "skipping non-code cell");
            continue;
        };
        let record = match &entry.execution_event_id {
            Some(id) => record.with_event_id(id.clone()),
            None => record,
        };
        if let LogOutcome::Ignored(reason) = provider.log_record(record) {
            debug!(cell = %entry.cell.id, ?reason, "execution not logged");
        }
    }
    provider
}
