/// Turn IPython magics and help queries into comments so the cell parses as Python.
///
/// Only lines that begin a logical statement are candidates. Lines inside open
/// brackets, triple-quoted strings or after a trailing backslash keep their
/// Python meaning, so `%` and `!` operators there are left alone.
///
/// Line count and line positions are preserved exactly, so statement ranges
/// computed on the rewritten text map back onto the original lines.
pub fn comment_out_magics(text: &str) -> String {
    let mut scanner = LineScanner::default();
    text.split('\n')
        .map(|line| {
            if scanner.at_statement_start() && is_magic_or_help(line) {
                let trimmed = line.trim_start();
                let indent = &line[..line.len() - trimmed.len()];
                format!("{indent}#{trimmed}")
            } else {
                scanner.scan(line);
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_magic_or_help(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('%') || trimmed.starts_with('!') {
        return true;
    }
    // `obj?` / `obj??`; a `?` inside a comment or string does not count.
    let code_len = LineScanner::default().scan(trimmed);
    trimmed[..code_len].trim_end().ends_with('?')
}

/// Tracks just enough lexical state to tell where logical statements begin.
#[derive(Debug, Default)]
struct LineScanner {
    depth: usize,
    /// Quote byte of a triple-quoted string still open at end of line.
    open_triple: Option<u8>,
    continued: bool,
}

impl LineScanner {
    fn at_statement_start(&self) -> bool {
        self.depth == 0 && self.open_triple.is_none() && !self.continued
    }

    /// Consume one line. Returns the byte length of its code part, before any comment.
    fn scan(&mut self, line: &str) -> usize {
        let bytes = line.as_bytes();
        let mut quote: Option<u8> = None;
        let mut i = 0;
        self.continued = false;
        while i < bytes.len() {
            let b = bytes[i];
            if let Some(q) = self.open_triple {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if bytes[i..].starts_with(&[q, q, q]) {
                    self.open_triple = None;
                    i += 3;
                    continue;
                }
                i += 1;
                continue;
            }
            if let Some(q) = quote {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
                i += 1;
                continue;
            }
            match b {
                b'#' => return i,
                b'\'' | b'"' => {
                    if bytes[i..].starts_with(&[b, b, b]) {
                        self.open_triple = Some(b);
                        i += 3;
                        continue;
                    }
                    quote = Some(b);
                }
                b'(' | b'[' | b'{' => self.depth += 1,
                b')' | b']' | b'}' => self.depth = self.depth.saturating_sub(1),
                b'\\' if line[i + 1..].trim().is_empty() => self.continued = true,
                _ => {}
            }
            i += 1;
        }
        bytes.len()
    }
}
