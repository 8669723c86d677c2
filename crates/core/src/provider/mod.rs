//! Host-facing gather provider.
//!
//! Wraps one `ExecutionLog` with the settings a host cares about: the enabled
//! flag and the cell marker. The provider never talks to the user; whether a
//! settings change needs a reload is returned to the host to act on.

use tracing::{debug, info};

use crate::assembler::ProgramAssembler;
use crate::history::{ExecutionLog, LogOutcome};
use crate::model::{CellRecord, ExecutionEventId, HostCell, PersistentId};
use crate::settings::GatherSettings;
use crate::slicer::{ExecutionSlicer, SliceResult};

/// What changed after `GatherProvider::update_settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// The enabled flag flipped; hosts typically prompt for a reload.
    pub reload_required: bool,
}

#[derive(Debug)]
pub struct GatherProvider {
    settings: GatherSettings,
    enabled: bool,
    log: ExecutionLog,
}

impl GatherProvider {
    pub fn new(settings: GatherSettings) -> Self {
        Self::with_log(settings, ExecutionLog::default())
    }

    pub fn with_log(settings: GatherSettings, log: ExecutionLog) -> Self {
        let enabled = settings.enable_gather;
        info!(enabled, analyzer = log.analyzer().name(), "Gathering tools have been activated");
        Self { settings, enabled, log }
    }

    /// Log a finished host cell. Non-code cells are skipped.
    ///
    /// Returns the event id assigned to the execution when it was appended.
    pub fn log_execution(&mut self, cell: &HostCell) -> Option<ExecutionEventId> {
        let record = CellRecord::from_host_cell(cell)?;
        let event_id = record.execution_event_id.clone();
        self.log_record(record).is_appended().then_some(event_id)
    }

    pub fn log_record(&mut self, record: CellRecord) -> LogOutcome {
        self.log.log_execution(record)
    }

    pub fn reset_log(&mut self) {
        debug!(records = self.log.len(), "resetting gather log");
        self.log.reset();
    }

    /// Program containing everything the latest run of `cell` depends on.
    ///
    /// Empty when the cell is not code or has never been logged.
    pub fn gather_code(&self, cell: &HostCell) -> String {
        if CellRecord::from_host_cell(cell).is_none() {
            return String::new();
        }
        let slice = self.slicer().slice_latest_execution(&PersistentId::new(cell.id.clone()));
        self.assembler().render(&slice)
    }

    /// Program for one specific execution. Empty when the event is unknown.
    pub fn gather_execution(&self, id: &ExecutionEventId) -> String {
        self.assembler().render(&self.slice(id))
    }

    pub fn slice(&self, id: &ExecutionEventId) -> SliceResult {
        self.slicer().slice(id)
    }

    pub fn slicer(&self) -> ExecutionSlicer<'_> {
        ExecutionSlicer::new(&self.log)
    }

    pub fn assembler(&self) -> ProgramAssembler {
        ProgramAssembler::new(self.settings.cell_marker())
    }

    pub fn execution_log(&self) -> &ExecutionLog {
        &self.log
    }

    pub fn settings(&self) -> &GatherSettings {
        &self.settings
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Gating is the host's job; this flag is informational for the core.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn update_settings(&mut self, settings: GatherSettings) -> SettingsUpdate {
        let reload_required = self.enabled != settings.enable_gather;
        if reload_required {
            self.enabled = settings.enable_gather;
            info!(enabled = self.enabled, "gather enable setting changed");
        }
        self.settings = settings;
        SettingsUpdate { reload_required }
    }
}
