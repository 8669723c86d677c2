use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use gather_core::model::{ExecutionEventId, PersistentId};
use gather_core::settings::SettingsLayout;
use tracing::warn;

use crate::canonicalize_or_current;
use crate::commands::{load_root_settings, load_transcript, replay_transcript};

/// Which execution to gather for.
#[derive(Debug, Clone)]
pub enum GatherTarget {
    /// Latest run of a logical cell.
    Cell(String),
    /// One specific execution event.
    Event(String),
}

/// Replay a session and emit the program the target depends on.
///
/// Unknown targets produce empty output, not an error.
pub fn gather_command(
    root: &str,
    session: &str,
    target: GatherTarget,
    marker: Option<String>,
    output: Option<&str>,
) -> Result<()> {
    let mut settings = load_root_settings(root)?;
    if !settings.enable_gather {
        let layout = SettingsLayout::new(canonicalize_or_current(root)?);
        return Err(anyhow!(
            "Gathering is disabled; set enable_gather in {}",
            layout.settings_path.display()
        ));
    }
    if marker.is_some() {
        settings = settings.with_cell_marker(marker);
    }

    let transcript = load_transcript(Path::new(session))?;
    let provider = replay_transcript(&transcript, settings);
    let slice = match &target {
        GatherTarget::Cell(id) => provider.slicer().slice_latest_execution(&PersistentId::new(id)),
        GatherTarget::Event(id) => provider.slice(&ExecutionEventId::new(id)),
    };
    if slice.is_empty() {
        warn!(?target, "no logged execution matches the target");
    }
    let program = provider.assembler().render(&slice);

    match output {
        Some(path) => fs::write(path, &program)
            .with_context(|| format!("Failed to write gathered program to {path}"))?,
        None => print!("{program}"),
    }
    Ok(())
}
