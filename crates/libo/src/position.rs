//! Source position tracking (spec.md §3 "Source Position").
//!
//! A [`SourcePosition`] is the immutable `(line, column, file-label)` triple
//! carried by every token and AST node for diagnostic anchoring. Lines and
//! columns are both 1-based.

use std::sync::Arc;

use crate::file::SourceFile;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
    pub file: Arc<str>,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32, file: &SourceFile) -> Self {
        Self {
            line,
            column,
            file: Arc::from(file.label()),
        }
    }

    /// A position with no meaningful source anchor, used for built-in
    /// declarations that are not backed by user source text (spec.md §4.5
    /// "Built-ins are registered before user classes").
    pub fn synthetic() -> Self {
        Self {
            line: 0,
            column: 0,
            file: Arc::from("<builtin>"),
        }
    }
}

impl std::fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl PartialOrd for SourcePosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourcePosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.file, self.line, self.column).cmp(&(&other.file, other.line, other.column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_file_line_col() {
        let file = SourceFile::new("a.o", "");
        let position = SourcePosition::new(3, 7, &file);
        assert_eq!(position.to_string(), "a.o:3:7");
    }

    #[test]
    fn orders_lexicographically_by_line_then_column() {
        let file = SourceFile::new("a.o", "");
        let first = SourcePosition::new(1, 5, &file);
        let second = SourcePosition::new(1, 6, &file);
        let third = SourcePosition::new(2, 1, &file);
        assert!(first < second);
        assert!(second < third);
    }
}
