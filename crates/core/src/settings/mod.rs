//! Gather settings and where they live on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::assembler::DEFAULT_CELL_MARKER;

fn default_enabled() -> bool {
    true
}

/// Serializable host settings for code gathering.
///
/// This lives at `.gather/settings.json` under the session root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherSettings {
    /// Whether the host forwards executions to the gather log at all.
    #[serde(default = "default_enabled")]
    pub enable_gather: bool,
    /// Cell boundary marker for gathered programs. Falls back to `# %%`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cell_marker: Option<String>,
}

impl Default for GatherSettings {
    fn default() -> Self {
        Self { enable_gather: true, default_cell_marker: None }
    }
}

impl GatherSettings {
    pub fn with_cell_marker(mut self, marker: Option<String>) -> Self {
        self.default_cell_marker = marker;
        self
    }

    /// Configured marker, ignoring blank values.
    pub fn cell_marker(&self) -> &str {
        match self.default_cell_marker.as_deref() {
            Some(marker) if !marker.trim().is_empty() => marker,
            _ => DEFAULT_CELL_MARKER,
        }
    }
}

/// Paths derived from a session root. Performs no IO.
#[derive(Debug, Clone)]
pub struct SettingsLayout {
    pub root: PathBuf,
    /// Directory for gather metadata (.gather).
    pub meta_dir: PathBuf,
    pub settings_path: PathBuf,
}

impl SettingsLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".gather");
        let settings_path = meta_dir.join("settings.json");
        Self { root, meta_dir, settings_path }
    }
}

/// Load settings JSON from disk.
pub fn load_settings(path: &Path) -> Result<GatherSettings> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read gather settings at {}", path.display()))?;
    let settings: GatherSettings =
        serde_json::from_str(&json).context("Failed to parse gather settings JSON")?;
    Ok(settings)
}

/// Load settings from a layout, using defaults when the file does not exist.
pub fn load_settings_or_default(layout: &SettingsLayout) -> Result<GatherSettings> {
    if !layout.settings_path.exists() {
        return Ok(GatherSettings::default());
    }
    load_settings(&layout.settings_path)
}

/// Write settings JSON, creating the metadata directory if needed.
pub fn save_settings(layout: &SettingsLayout, settings: &GatherSettings) -> Result<()> {
    std::fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&layout.settings_path, json).with_context(|| {
        format!("Failed to write gather settings to {}", layout.settings_path.display())
    })?;
    Ok(())
}
