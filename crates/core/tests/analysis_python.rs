use std::collections::BTreeSet;

use gather_core::analysis::{AnalysisError, DataflowAnalyzer, DependencyFacts, PythonAnalyzer};

fn analyze(text: &str) -> DependencyFacts {
    PythonAnalyzer::new().analyze(text).expect("analysis should succeed")
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn simple_assignments_define_and_use() {
    let facts = analyze("x = 1\ny = x + 1\nz = y");
    assert_eq!(facts.statements.len(), 3);
    assert_eq!(facts.statements[0].defs, names(&["x"]));
    assert!(facts.statements[0].uses.is_empty());
    assert_eq!(facts.statements[1].defs, names(&["y"]));
    assert_eq!(facts.statements[1].uses, names(&["x"]));
    assert_eq!(facts.statements[2].uses, names(&["y"]));
}

#[test]
fn call_arguments_are_reads() {
    let facts = analyze("print(y)");
    assert_eq!(facts.statements.len(), 1);
    assert!(facts.statements[0].uses.contains("y"));
    assert!(facts.statements[0].defs.is_empty());
}

#[test]
fn statement_ranges_cover_multiline_statements() {
    let facts = analyze("y = f(\n    x,\n)\nz = y\n");
    assert_eq!(facts.statements.len(), 2);
    assert_eq!((facts.statements[0].start_line, facts.statements[0].end_line), (0, 2));
    assert_eq!((facts.statements[1].start_line, facts.statements[1].end_line), (3, 3));
    assert_eq!(facts.statements[1].index, 1);
}

#[test]
fn comments_are_not_statements() {
    let facts = analyze("# load data\nx = 1\n");
    assert_eq!(facts.statements.len(), 1);
    assert_eq!(facts.statements[0].start_line, 1);
}

#[test]
fn imports_bind_top_level_names() {
    let facts = analyze(
        "import numpy as np\nimport os.path\nfrom a import b, c as d\nfrom m import *\n",
    );
    assert_eq!(facts.statements[0].defs, names(&["np"]));
    assert_eq!(facts.statements[1].defs, names(&["os"]));
    assert_eq!(facts.statements[2].defs, names(&["b", "d"]));
    assert!(facts.statements[3].defs.is_empty());
}

#[test]
fn function_definition_uses_only_free_names() {
    let facts = analyze("def f(a, b=k):\n    c = a + g\n    return c * b\n");
    assert_eq!(facts.statements.len(), 1);
    assert_eq!(facts.statements[0].defs, names(&["f"]));
    assert_eq!(facts.statements[0].uses, names(&["g", "k"]));
}

#[test]
fn class_definition_uses_bases_and_body_reads() {
    let facts = analyze(
        "class Model(Base):\n    rate = default_rate\n    def fit(self):\n        return self.rate\n",
    );
    assert_eq!(facts.statements[0].defs, names(&["Model"]));
    assert_eq!(facts.statements[0].uses, names(&["Base", "default_rate"]));
}

#[test]
fn element_and_member_stores_redefine_the_container() {
    let facts = analyze("df['col'] = 1\nobj.attr = v\n");
    assert_eq!(facts.statements[0].defs, names(&["df"]));
    assert_eq!(facts.statements[0].uses, names(&["df"]));
    assert_eq!(facts.statements[1].defs, names(&["obj"]));
    assert_eq!(facts.statements[1].uses, names(&["obj", "v"]));
}

#[test]
fn augmented_assignment_reads_and_writes() {
    let facts = analyze("total += x");
    assert_eq!(facts.statements[0].defs, names(&["total"]));
    assert_eq!(facts.statements[0].uses, names(&["total", "x"]));
}

#[test]
fn tuple_targets_bind_every_name() {
    let facts = analyze("a, (b, c) = values");
    assert_eq!(facts.statements[0].defs, names(&["a", "b", "c"]));
    assert_eq!(facts.statements[0].uses, names(&["values"]));
}

#[test]
fn comprehension_and_lambda_variables_are_local() {
    let facts = analyze("squares = [i * i for i in nums]\nf = lambda z: z + w\n");
    assert_eq!(facts.statements[0].uses, names(&["nums"]));
    assert_eq!(facts.statements[1].uses, names(&["w"]));
}

#[test]
fn keyword_argument_names_and_attribute_members_are_not_reads() {
    let facts = analyze("plot(data.values, color=c)");
    assert_eq!(facts.statements[0].uses, names(&["c", "data", "plot"]));
}

#[test]
fn for_loop_binds_target_and_unions_body() {
    let facts = analyze("for row in rows:\n    acc.append(row)\n");
    assert_eq!(facts.statements.len(), 1);
    let stmt = &facts.statements[0];
    assert_eq!((stmt.start_line, stmt.end_line), (0, 1));
    assert!(stmt.defs.contains("row"));
    assert!(stmt.uses.contains("rows"));
    assert!(stmt.uses.contains("acc"));
}

#[test]
fn with_statement_binds_alias() {
    let facts = analyze("with open(p) as fh:\n    data = fh.read()\n");
    let stmt = &facts.statements[0];
    assert!(stmt.defs.contains("fh"));
    assert!(stmt.defs.contains("data"));
    assert!(stmt.uses.contains("p"));
}

#[test]
fn if_statement_unions_branches() {
    let facts = analyze("if flag:\n    x = a\nelse:\n    y = b\n");
    let stmt = &facts.statements[0];
    assert_eq!(stmt.defs, names(&["x", "y"]));
    assert_eq!(stmt.uses, names(&["a", "b", "flag"]));
}

#[test]
fn magics_are_ignored_but_keep_line_positions() {
    let facts = analyze("%matplotlib inline\nx = 1\n");
    assert_eq!(facts.statements.len(), 1);
    assert_eq!(facts.statements[0].start_line, 1);
    assert_eq!(facts.statements[0].defs, names(&["x"]));
}

#[test]
fn trailing_comment_ending_in_question_mark_keeps_the_statement() {
    let facts = analyze("y = x + 1  # why?\n");
    assert_eq!(facts.statements.len(), 1);
    assert_eq!(facts.statements[0].defs, names(&["y"]));
    assert_eq!(facts.statements[0].uses, names(&["x"]));
}

#[test]
fn help_queries_are_ignored() {
    let facts = analyze("obj?\nz = obj\n");
    assert_eq!(facts.statements.len(), 1);
    assert_eq!(facts.statements[0].start_line, 1);
    assert_eq!(facts.statements[0].defs, names(&["z"]));
}

#[test]
fn modulo_on_a_continuation_line_is_an_operator() {
    let facts = analyze("s = (fmt\n     % x)\n");
    assert_eq!(facts.statements.len(), 1);
    assert_eq!((facts.statements[0].start_line, facts.statements[0].end_line), (0, 1));
    assert_eq!(facts.statements[0].defs, names(&["s"]));
    assert_eq!(facts.statements[0].uses, names(&["fmt", "x"]));
}

#[test]
fn percent_inside_strings_is_left_alone() {
    let facts = analyze("label = \"%d rows\" % n\n");
    assert_eq!(facts.statements[0].defs, names(&["label"]));
    assert_eq!(facts.statements[0].uses, names(&["n"]));
}

#[test]
fn method_calls_update_their_receiver() {
    let facts = analyze("items.append(4)\ndf.drop(cols, inplace=True)\nmodel.layers[0].reset()\n");
    assert_eq!(facts.statements[0].defs, names(&["items"]));
    assert_eq!(facts.statements[0].uses, names(&["items"]));
    assert_eq!(facts.statements[1].defs, names(&["df"]));
    assert_eq!(facts.statements[1].uses, names(&["cols", "df"]));
    assert_eq!(facts.statements[2].defs, names(&["model"]));
}

#[test]
fn plain_calls_and_local_receivers_define_nothing() {
    let facts = analyze("print(x)\nf = lambda xs: xs.append(1)\n");
    assert!(facts.statements[0].defs.is_empty());
    assert_eq!(facts.statements[1].defs, names(&["f"]));
    assert!(facts.statements[1].uses.is_empty());
}

#[test]
fn except_alias_is_bound_not_read() {
    let facts = analyze("try:\n    r = risky()\nexcept ValueError as err:\n    failed = True\n");
    let stmt = &facts.statements[0];
    assert_eq!(stmt.defs, names(&["err", "failed", "r"]));
    assert_eq!(stmt.uses, names(&["ValueError", "risky"]));
}

#[test]
fn magics_fail_without_rewriting() {
    let analyzer = PythonAnalyzer::new().with_magics_rewriting(false);
    assert!(analyzer.analyze("!ls\nx = 1\n").is_err());
}

#[test]
fn syntax_errors_are_reported() {
    let err = PythonAnalyzer::new().analyze("x = 1\ny = = 2\n").unwrap_err();
    assert!(matches!(err, AnalysisError::Syntax { .. }));
}

#[test]
fn edges_link_reads_to_nearest_definition() {
    let facts = analyze("x = 1\nx = 2\ny = x\n");
    let edges = facts.edges();
    assert_eq!(edges.len(), 1);
    assert_eq!((edges[0].from, edges[0].to, edges[0].name.as_str()), (1, 2, "x"));
}

#[test]
fn analysis_is_deterministic() {
    let text = "import pandas as pd\ndf = pd.read_csv(path)\ndf['z'] = df.x + df.y\n";
    assert_eq!(analyze(text), analyze(text));
}
