use gather_core::assembler::{ProgramAssembler, DEFAULT_CELL_MARKER, GATHERED_PROGRAM_PREAMBLE};
use gather_core::model::{ExecutionEventId, PersistentId};
use gather_core::slicer::{CellSlice, SliceResult};

fn cell(event: &str, count: u32, lines: &[&str]) -> CellSlice {
    CellSlice {
        persistent_id: PersistentId::new(format!("cell-{event}")),
        execution_event_id: ExecutionEventId::new(event),
        execution_count: Some(count),
        statements: (0..lines.len()).collect(),
        text_slice_lines: lines.iter().map(|l| l.to_string()).collect(),
    }
}

#[test]
fn render_marks_every_group_and_terminates_lines() {
    let result = SliceResult {
        target: Some(ExecutionEventId::new("e2")),
        cell_slices: vec![cell("e1", 1, &["import os", "base = os.getcwd()"]), cell("e2", 2, &["print(base)"])],
    };
    let program = ProgramAssembler::default().render(&result);
    assert_eq!(
        program,
        format!(
            "{GATHERED_PROGRAM_PREAMBLE}{DEFAULT_CELL_MARKER}\nimport os\nbase = os.getcwd()\n{DEFAULT_CELL_MARKER}\nprint(base)\n"
        )
    );
}

#[test]
fn custom_marker_is_treated_as_opaque_text() {
    let result = SliceResult {
        target: Some(ExecutionEventId::new("e1")),
        cell_slices: vec![cell("e1", 1, &["x = 1"])],
    };
    let program = ProgramAssembler::new("#%% [cell]").with_preamble("").render(&result);
    assert_eq!(program, "#%% [cell]\nx = 1\n");
}

#[test]
fn indentation_and_blank_lines_inside_a_group_are_preserved() {
    let result = SliceResult {
        target: Some(ExecutionEventId::new("e1")),
        cell_slices: vec![cell("e1", 1, &["def f():", "", "    return 1"])],
    };
    let program = ProgramAssembler::new("# %%").with_preamble("").render(&result);
    assert_eq!(program, "# %%\ndef f():\n\n    return 1\n");
}

#[test]
fn empty_result_renders_nothing() {
    assert_eq!(ProgramAssembler::default().render(&SliceResult::empty()), "");
}
