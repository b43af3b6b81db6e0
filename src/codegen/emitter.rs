//! # Code Emitter
//!
//! Line buffer shared by every converter. Each line is indented by its nesting
//! depth; fragments produced by nested converters are spliced in unchanged since
//! they already carry absolute indentation.

/// Accumulates indented script lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeEmitter {
    indent: String,
    lines: Vec<String>,
}

impl CodeEmitter {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            lines: Vec::new(),
        }
    }

    /// Empty emitter sharing this emitter's indentation unit
    pub fn fork(&self) -> Self {
        Self::new(self.indent.clone())
    }

    /// Push `text` at `depth`
    pub fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        let mut line = self.indent.repeat(depth);
        line.push_str(text.as_ref());
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Append another fragment's lines
    pub fn append(&mut self, fragment: CodeEmitter) {
        self.lines.extend(fragment.lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Join into a script body terminated by a newline
    pub fn finish(self) -> String {
        let mut code = self.lines.join("\n");
        if !code.is_empty() {
            code.push('\n');
        }
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_per_depth() {
        let mut out = CodeEmitter::new("    ");
        out.line(0, "if x:");
        out.line(1, "y = 1");
        out.line(2, "z = 2");
        assert_eq!(out.finish(), "if x:\n    y = 1\n        z = 2\n");
    }

    #[test]
    fn test_append_fragment() {
        let mut out = CodeEmitter::new("\t");
        let mut fragment = out.fork();
        fragment.line(1, "a = 1");
        out.line(0, "if b:");
        out.append(fragment);
        assert_eq!(out.lines(), &["if b:".to_string(), "\ta = 1".to_string()]);
    }

    #[test]
    fn test_empty_finish() {
        assert_eq!(CodeEmitter::new("  ").finish(), "");
    }
}
