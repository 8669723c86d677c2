use std::collections::BTreeSet;

use tree_sitter::{Node, Parser};

use super::{comment_out_magics, AnalysisError, DataflowAnalyzer, DependencyFacts, StatementFacts};

/// tree-sitter backed analyzer for Python cells.
#[derive(Debug, Clone)]
pub struct PythonAnalyzer {
    rewrite_magics: bool,
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self { rewrite_magics: true }
    }
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether IPython magics are commented out before parsing (default: on).
    pub fn with_magics_rewriting(mut self, enabled: bool) -> Self {
        self.rewrite_magics = enabled;
        self
    }
}

impl DataflowAnalyzer for PythonAnalyzer {
    fn analyze(&self, text: &str) -> Result<DependencyFacts, AnalysisError> {
        let source = if self.rewrite_magics { comment_out_magics(text) } else { text.to_string() };

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::language())
            .map_err(|e| AnalysisError::Language(e.to_string()))?;
        let tree = parser.parse(&source, None).ok_or(AnalysisError::ParseAborted)?;
        let root = tree.root_node();
        if root.has_error() {
            let row = first_error_row(root).unwrap_or(0);
            return Err(AnalysisError::Syntax { line: row + 1 });
        }

        let mut statements = Vec::new();
        for node in named_children(root) {
            if node.kind() == "comment" {
                continue;
            }
            let mut builder = FactBuilder::new(source.as_bytes());
            builder.statement(node);

            let start_line = node.start_position().row;
            let end = node.end_position();
            let end_line =
                if end.column == 0 && end.row > start_line { end.row - 1 } else { end.row };

            statements.push(StatementFacts {
                index: statements.len(),
                start_line,
                end_line,
                defs: builder.defs,
                uses: builder.uses,
            });
        }

        Ok(DependencyFacts { statements })
    }

    fn name(&self) -> &'static str {
        "python"
    }
}

fn first_error_row(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().filter(|c| c.has_error()).find_map(first_error_row)
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Named children paired with the grammar field they occupy, if any.
fn fields(node: Node) -> Vec<(Option<&'static str>, Node)> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return out;
    }
    loop {
        let child = cursor.node();
        if child.is_named() {
            out.push((cursor.field_name(), child));
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    out
}

fn is_statement_kind(kind: &str) -> bool {
    kind.ends_with("_statement") || kind.ends_with("_definition")
}

/// Accumulates def/use facts while walking one statement.
struct FactBuilder<'s> {
    source: &'s [u8],
    defs: BTreeSet<String>,
    uses: BTreeSet<String>,
    /// Plain name bindings. Member and element stores count as defs but not here,
    /// since they never create a local inside a function body.
    bound: BTreeSet<String>,
}

impl<'s> FactBuilder<'s> {
    fn new(source: &'s [u8]) -> Self {
        Self { source, defs: BTreeSet::new(), uses: BTreeSet::new(), bound: BTreeSet::new() }
    }

    fn text(&self, node: Node) -> String {
        node.utf8_text(self.source).unwrap_or_default().to_string()
    }

    fn define(&mut self, name: String) {
        self.bound.insert(name.clone());
        self.defs.insert(name);
    }

    fn statement(&mut self, node: Node) {
        match node.kind() {
            "expression_statement" => {
                for child in named_children(node) {
                    match child.kind() {
                        "assignment" => self.assignment(child),
                        "augmented_assignment" => self.augmented_assignment(child),
                        _ => self.read(child),
                    }
                }
            }
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                self.import(node)
            }
            "function_definition" => self.function_definition(node),
            "class_definition" => self.class_definition(node),
            "decorated_definition" => {
                for child in named_children(node) {
                    if child.kind() == "decorator" {
                        self.read(child);
                    } else {
                        self.statement(child);
                    }
                }
            }
            "for_statement" => {
                for (field, child) in fields(node) {
                    if field == Some("left") {
                        self.bind(child);
                    } else {
                        self.compound_part(child);
                    }
                }
            }
            "global_statement" | "nonlocal_statement" | "comment" => {}
            _ => self.compound(node),
        }
    }

    /// Compound statements and clauses: union of everything nested inside.
    fn compound(&mut self, node: Node) {
        for (field, child) in fields(node) {
            if field == Some("alias") {
                self.bind(child);
            } else {
                self.compound_part(child);
            }
        }
    }

    fn compound_part(&mut self, node: Node) {
        match node.kind() {
            "comment" => {}
            "block" => {
                for child in named_children(node) {
                    self.statement(child);
                }
            }
            "with_item" | "as_pattern" => self.compound(node),
            "except_clause" | "except_group_clause" => self.except_clause(node),
            kind if kind.ends_with("_clause") => self.compound(node),
            kind if is_statement_kind(kind) => self.statement(node),
            _ => self.read(node),
        }
    }

    /// `except E as err`: the name after `as` is bound, never read.
    fn except_clause(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let mut after_as = false;
        for child in children {
            if !child.is_named() {
                after_as = matches!(child.kind(), "as" | ",");
                continue;
            }
            if after_as {
                self.bind(child);
                after_as = false;
            } else {
                self.compound_part(child);
            }
        }
    }

    fn assignment(&mut self, node: Node) {
        for (field, child) in fields(node) {
            match field {
                Some("left") => self.bind(child),
                Some("right") if child.kind() == "assignment" => self.assignment(child),
                _ => self.read(child),
            }
        }
    }

    fn augmented_assignment(&mut self, node: Node) {
        for (field, child) in fields(node) {
            if field == Some("left") {
                self.read(child);
                self.bind(child);
            } else {
                self.read(child);
            }
        }
    }

    fn import(&mut self, node: Node) {
        for (field, child) in fields(node) {
            if field != Some("name") {
                continue;
            }
            let bound = match child.kind() {
                "aliased_import" => child.child_by_field_name("alias"),
                // `import a.b` binds `a`.
                "dotted_name" => child.named_child(0),
                _ => None,
            };
            if let Some(name) = bound {
                let name = self.text(name);
                self.define(name);
            }
        }
    }

    fn function_definition(&mut self, node: Node) {
        let mut locals = BTreeSet::new();
        for (field, child) in fields(node) {
            match field {
                Some("name") => {}
                Some("parameters") => self.parameters(child, &mut locals),
                Some("body") => {
                    let mut body = FactBuilder::new(self.source);
                    body.compound_part(child);
                    locals.extend(body.bound.iter().cloned());
                    self.uses.extend(body.uses.into_iter().filter(|n| !locals.contains(n)));
                }
                _ => self.read(child),
            }
        }
        if let Some(name) = node.child_by_field_name("name") {
            let name = self.text(name);
            self.define(name);
        }
    }

    fn class_definition(&mut self, node: Node) {
        for (field, child) in fields(node) {
            match field {
                Some("name") => {}
                Some("body") => {
                    let mut body = FactBuilder::new(self.source);
                    body.compound_part(child);
                    let locals = body.bound;
                    self.uses.extend(body.uses.into_iter().filter(|n| !locals.contains(n)));
                }
                _ => self.read(child),
            }
        }
        if let Some(name) = node.child_by_field_name("name") {
            let name = self.text(name);
            self.define(name);
        }
    }

    /// Collect parameter names into `locals`; defaults and annotations are reads.
    fn parameters(&mut self, node: Node, locals: &mut BTreeSet<String>) {
        for param in named_children(node) {
            match param.kind() {
                "identifier" => {
                    locals.insert(self.text(param));
                }
                "list_splat_pattern" | "dictionary_splat_pattern" | "tuple_pattern" => {
                    self.pattern_names(param, locals)
                }
                "default_parameter" | "typed_parameter" | "typed_default_parameter" => {
                    for (field, child) in fields(param) {
                        match field {
                            Some("type") | Some("value") => self.read(child),
                            _ => self.pattern_names(child, locals),
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn pattern_names(&self, node: Node, out: &mut BTreeSet<String>) {
        if matches!(node.kind(), "identifier" | "keyword_identifier") {
            out.insert(self.text(node));
            return;
        }
        for child in named_children(node) {
            self.pattern_names(child, out);
        }
    }

    /// Record the names bound by an assignment target.
    fn bind(&mut self, node: Node) {
        match node.kind() {
            "identifier" | "keyword_identifier" => {
                let name = self.text(node);
                self.define(name);
            }
            "as_pattern_target" if node.named_child_count() == 0 => {
                let name = self.text(node);
                self.define(name);
            }
            "attribute" | "subscript" => {
                // Storing into a member or element redefines the container.
                if let Some(base) = self.base_name(node) {
                    self.defs.insert(base.clone());
                    self.uses.insert(base);
                }
                self.read(node);
            }
            _ => {
                for child in named_children(node) {
                    self.bind(child);
                }
            }
        }
    }

    fn base_name(&self, node: Node) -> Option<String> {
        let mut current = node;
        loop {
            current = match current.kind() {
                "identifier" => return Some(self.text(current)),
                "attribute" => current.child_by_field_name("object")?,
                "subscript" => current.child_by_field_name("value")?,
                _ => return None,
            };
        }
    }

    fn read(&mut self, node: Node) {
        self.read_in(node, &BTreeSet::new());
    }

    fn read_in(&mut self, node: Node, locals: &BTreeSet<String>) {
        match node.kind() {
            "identifier" | "keyword_identifier" => {
                let name = self.text(node);
                if !locals.contains(&name) {
                    self.uses.insert(name);
                }
            }
            "comment" => {}
            "attribute" => {
                if let Some(object) = node.child_by_field_name("object") {
                    self.read_in(object, locals);
                }
            }
            "call" => {
                // A method call may update its receiver in place.
                let receiver = node
                    .child_by_field_name("function")
                    .filter(|f| f.kind() == "attribute")
                    .and_then(|f| self.base_name(f));
                if let Some(base) = receiver.filter(|b| !locals.contains(b)) {
                    self.defs.insert(base.clone());
                    self.uses.insert(base);
                }
                for child in named_children(node) {
                    self.read_in(child, locals);
                }
            }
            "keyword_argument" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.read_in(value, locals);
                }
            }
            "named_expression" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.read_in(value, locals);
                }
                if let Some(name) = node.child_by_field_name("name") {
                    let name = self.text(name);
                    self.define(name);
                }
            }
            "lambda" => {
                let mut inner = locals.clone();
                if let Some(params) = node.child_by_field_name("parameters") {
                    self.parameters(params, &mut inner);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.read_in(body, &inner);
                }
            }
            "list_comprehension"
            | "set_comprehension"
            | "dictionary_comprehension"
            | "generator_expression" => {
                let mut inner = locals.clone();
                for clause in named_children(node) {
                    if clause.kind() == "for_in_clause" {
                        if let Some(left) = clause.child_by_field_name("left") {
                            self.pattern_names(left, &mut inner);
                        }
                    }
                }
                for (_, child) in fields(node) {
                    if child.kind() == "for_in_clause" {
                        for (field, part) in fields(child) {
                            if field != Some("left") {
                                self.read_in(part, &inner);
                            }
                        }
                    } else {
                        self.read_in(child, &inner);
                    }
                }
            }
            _ => {
                for child in named_children(node) {
                    self.read_in(child, locals);
                }
            }
        }
    }
}
