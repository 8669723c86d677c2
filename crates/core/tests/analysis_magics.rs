use gather_core::analysis::comment_out_magics;

#[test]
fn comments_line_and_cell_magics() {
    let text = "%%time\n%matplotlib inline\n!pip install x\nx = 1\n";
    assert_eq!(comment_out_magics(text), "#%%time\n#%matplotlib inline\n#!pip install x\nx = 1\n");
}

#[test]
fn keeps_indentation_and_plain_code() {
    let text = "for i in range(3):\n    %time f(i)\n    g(i)";
    assert_eq!(comment_out_magics(text), "for i in range(3):\n    #%time f(i)\n    g(i)");
}

#[test]
fn comments_help_queries() {
    assert_eq!(comment_out_magics("df.head?\ny = 2"), "#df.head?\ny = 2");
}

#[test]
fn preserves_line_count() {
    let text = "a = 1\n%who\n\nb = a\n";
    assert_eq!(comment_out_magics(text).split('\n').count(), text.split('\n').count());
}

#[test]
fn double_question_mark_is_a_help_query() {
    assert_eq!(comment_out_magics("obj??\nobj?"), "#obj??\n#obj?");
}

#[test]
fn question_marks_in_comments_and_strings_are_code() {
    let text = "x = 1  # ok?\ns = \"why?\"\n# really?";
    assert_eq!(comment_out_magics(text), text);
}

#[test]
fn operators_on_continuation_lines_are_kept() {
    let text = "s = (fmt\n     % x)\nok = (a\n      != b)\nt = fmt \\\n    % y";
    assert_eq!(comment_out_magics(text), text);
}

#[test]
fn triple_quoted_strings_are_not_rewritten() {
    let text = "doc = \"\"\"\n%d items\n!important\n\"\"\"\n%who";
    assert_eq!(comment_out_magics(text), "doc = \"\"\"\n%d items\n!important\n\"\"\"\n#%who");
}

#[test]
fn magics_after_a_closed_bracket_are_rewritten() {
    let text = "x = f(\n    a,\n)\n%time g(x)";
    assert_eq!(comment_out_magics(text), "x = f(\n    a,\n)\n#%time g(x)");
}
