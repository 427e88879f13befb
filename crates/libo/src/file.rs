//! Source file identity.
//!
//! A [`SourceFile`] pairs the raw source text with the label the caller
//! supplied for it (typically a file path). It is cheap to clone: both
//! fields are reference-counted so every token, AST node, and diagnostic
//! can carry its own copy without re-allocating the source text.

use std::sync::Arc;

use libo_macros_core::SourceCode;

/// A single compilation unit: source text plus the label used to identify
/// it in diagnostics (`file:line:col`, spec.md §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    label: Arc<str>,
    code: Arc<str>,
}

impl SourceFile {
    pub fn new(label: impl Into<Arc<str>>, code: impl Into<Arc<str>>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Converts a 1-based (line, column) position into a byte offset into
    /// `code`, for `codespan-reporting` labels. Walks the text tracking
    /// line/column with the same rules as the lexer's whitespace loop.
    pub fn byte_offset(&self, line: u32, column: u32) -> usize {
        let mut offset = 0usize;
        let mut current_line = 1u32;
        let mut current_column = 1u32;
        for c in self.code.chars() {
            if current_line == line && current_column == column {
                return offset;
            }
            offset += c.len_utf8();
            if c == '\n' {
                current_line += 1;
                current_column = 1;
            } else if c != '\r' {
                current_column += 1;
            }
        }
        offset
    }
}

impl std::fmt::Display for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl From<SourceFile> for SourceCode {
    fn from(file: SourceFile) -> Self {
        SourceCode {
            source: file.code.to_string(),
            name: file.label.to_string(),
        }
    }
}

impl From<&SourceFile> for SourceCode {
    fn from(file: &SourceFile) -> Self {
        SourceCode {
            source: file.code.to_string(),
            name: file.label.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_label_and_code() {
        let file = SourceFile::new("main.o", "class Main is end");
        assert_eq!(file.label(), "main.o");
        assert_eq!(file.code(), "class Main is end");
        assert_eq!(file.to_string(), "main.o");
    }
}
