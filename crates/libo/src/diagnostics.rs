//! Diagnostics accumulation and rendering (spec.md §4.1, §6).
//!
//! [`Diagnostic`] is the passive record the spec describes: severity, kind,
//! message, primary position, optional secondary positions. Its `Display`
//! produces the exact wire format required by spec.md §6. [`DiagnosticsBag`]
//! accumulates diagnostics in insertion order; it never aborts control flow
//! itself, matching the teacher's `TirContext::errors`/`add_error` pattern
//! (`tir/context.rs`) generalized from a single accumulator field into its
//! own type.

use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::{self, termcolor::StandardStream};
use libo_macros_core::traits::DiagnosticInfo;
use simplelog::ColorChoice;

use crate::error::OErrorKind;
use crate::position::SourcePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERR"),
            Severity::Warning => write!(f, "WARN"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: &'static str,
    pub message: String,
    pub primary: SourcePosition,
    pub secondary: Vec<SourcePosition>,
}

impl Diagnostic {
    pub fn error(kind: &'static str, message: impl Into<String>, primary: SourcePosition) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            primary,
            secondary: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "**[ {} ] {} at {}: {}", self.severity, self.kind, self.primary, self.message)
    }
}

impl From<&OErrorKind> for Diagnostic {
    fn from(error: &OErrorKind) -> Self {
        Diagnostic::error(error.kind_name(), error.to_string(), error.position())
    }
}

/// Accumulates diagnostics in insertion order (spec.md §5 determinism:
/// diagnostic sequence must be byte-identical across runs on identical input).
#[derive(Debug, Default)]
pub struct DiagnosticsBag {
    entries: Vec<Diagnostic>,
}

impl DiagnosticsBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `diagnostic`, unless an entry with the same kind, primary
    /// position, and message is already present (spec.md §7: no diagnostic
    /// is duplicated for the same (kind, position, message)). A linear scan
    /// is enough at this scale and keeps insertion order hash-independent.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let is_duplicate = self
            .entries
            .iter()
            .any(|existing| existing.kind == diagnostic.kind && existing.primary == diagnostic.primary && existing.message == diagnostic.message);
        if !is_duplicate {
            self.entries.push(diagnostic);
        }
    }

    pub fn push_error(&mut self, error: &OErrorKind) {
        self.push(Diagnostic::from(error));
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Renders a rich, source-annotated report for a single error using
/// `codespan-reporting`, the teacher's `error.rs` `CodeSpanReportGenerator`
/// pattern generalized from `TirError` to [`OErrorKind`].
pub struct CodespanReportGenerator;

impl CodespanReportGenerator {
    fn inner_generate(files: &mut SimpleFiles<String, String>, diagnostics: &mut Vec<CodespanDiagnostic<usize>>, error: &dyn DiagnosticInfo) {
        let mut diagnostic: CodespanDiagnostic<usize> = CodespanDiagnostic::error().with_message(error.to_string());

        if let Some(source_code) = error.source_code() {
            let file_id = files.add(format!("{}.o", source_code.name), source_code.source);

            if let Some(labels) = error.labels() {
                let labels = labels
                    .into_iter()
                    .map(|label| Label::primary(file_id, label.position).with_message(label.label))
                    .collect::<Vec<_>>();
                diagnostic = diagnostic.with_labels(labels);
            }
        }

        if let Some(help) = error.help() {
            diagnostic = diagnostic.with_note(help.to_string());
        }

        diagnostics.push(diagnostic);

        if let Some(references) = error.references() {
            for reference in references.into_iter() {
                Self::inner_generate(files, diagnostics, *reference);
            }
        }

        if let Some(errors) = error.errors() {
            for inner_error in errors {
                Self::inner_generate(files, diagnostics, inner_error);
            }
        }
    }

    pub fn generate(error: &OErrorKind) {
        let mut diagnostics = Vec::new();
        let mut files = SimpleFiles::new();

        Self::inner_generate(&mut files, &mut diagnostics, error);

        let writer = StandardStream::stderr(ColorChoice::Always);
        let config = codespan_reporting::term::Config::default();

        for diagnostic in diagnostics.into_iter() {
            term::emit(&mut writer.lock(), &config, &files, &diagnostic).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::SourceFile;

    #[test]
    fn formats_per_wire_format() {
        let file = SourceFile::new("main.o", "class Main is end");
        let position = SourcePosition::new(3, 5, &file);
        let diagnostic = Diagnostic::error("UnknownType", "'Foo' type not found", position);
        assert_eq!(diagnostic.to_string(), "**[ ERR ] UnknownType at main.o:3:5: 'Foo' type not found");
    }

    #[test]
    fn bag_preserves_insertion_order_and_counts_errors() {
        let file = SourceFile::new("main.o", "class Main is end");
        let mut bag = DiagnosticsBag::new();
        bag.push(Diagnostic::error("UnknownType", "a", SourcePosition::new(1, 1, &file)));
        bag.push(Diagnostic::error("UnknownMember", "b", SourcePosition::new(2, 1, &file)));
        assert_eq!(bag.error_count(), 2);
        assert!(bag.has_errors());
        assert_eq!(bag.entries()[0].kind, "UnknownType");
        assert_eq!(bag.entries()[1].kind, "UnknownMember");
    }

    #[test]
    fn drops_an_exact_duplicate() {
        let file = SourceFile::new("main.o", "class Main is end");
        let mut bag = DiagnosticsBag::new();
        bag.push(Diagnostic::error("UnknownType", "'Foo' type not found", SourcePosition::new(1, 1, &file)));
        bag.push(Diagnostic::error("UnknownType", "'Foo' type not found", SourcePosition::new(1, 1, &file)));
        assert_eq!(bag.entries().len(), 1);
    }
}
