//! Program assembly: render a slice result as cell-delimited source text.

use crate::slicer::SliceResult;

/// Marker used when the host does not configure one.
pub const DEFAULT_CELL_MARKER: &str = "# %%";

/// Fixed header placed at the top of every gathered program.
pub const GATHERED_PROGRAM_PREAMBLE: &str = "# This file was generated by gathering the code a notebook cell depends on.\n\
# It contains only the statements needed to reproduce that cell's results.\n\n";

/// Renders slices as a sequence of marked cells.
#[derive(Debug, Clone)]
pub struct ProgramAssembler {
    cell_marker: String,
    preamble: String,
}

impl Default for ProgramAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_MARKER)
    }
}

impl ProgramAssembler {
    pub fn new(cell_marker: impl Into<String>) -> Self {
        Self { cell_marker: cell_marker.into(), preamble: GATHERED_PROGRAM_PREAMBLE.to_string() }
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn cell_marker(&self) -> &str {
        &self.cell_marker
    }

    /// Preamble, then each group as `<marker>\n<lines>\n`.
    ///
    /// An empty slice renders as an empty string, without the preamble.
    pub fn render(&self, slice: &SliceResult) -> String {
        if slice.is_empty() {
            return String::new();
        }
        let mut program = self.preamble.clone();
        for cell in &slice.cell_slices {
            program.push_str(&self.cell_marker);
            program.push('\n');
            for line in &cell.text_slice_lines {
                program.push_str(line);
                program.push('\n');
            }
        }
        program
    }
}

/// Render with an explicit marker and the default preamble.
pub fn render(slice: &SliceResult, cell_marker: &str) -> String {
    ProgramAssembler::new(cell_marker).render(slice)
}
