use anyhow::Result;
use gather_core::settings::{load_settings_or_default, save_settings, GatherSettings, SettingsLayout};

use crate::canonicalize_or_current;

/// Write `.gather/settings.json` under `root`.
pub fn init_settings_command(root: &str, marker: Option<String>, disabled: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = SettingsLayout::new(&root_path);
    let settings = GatherSettings { enable_gather: !disabled, default_cell_marker: marker };
    save_settings(&layout, &settings)?;

    println!("Initialized gather settings:");
    println!("  Path: {}", layout.settings_path.display());
    println!("  Enabled: {}", settings.enable_gather);
    println!("  Cell marker: {}", settings.cell_marker());
    Ok(())
}

/// Settings for `root`, falling back to defaults when none were written.
pub fn load_root_settings(root: &str) -> Result<GatherSettings> {
    let root_path = canonicalize_or_current(root)?;
    load_settings_or_default(&SettingsLayout::new(&root_path))
}
