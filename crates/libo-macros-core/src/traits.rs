//! Traits and types for rich error handling in the O compiler.
//!
//! This module provides the core traits and supporting types that enable
//! the compiler's diagnostic system to produce detailed output with source
//! locations, labels, help text, and error chaining.

use std::{fmt::{Debug, Display}, ops::Range};

/// Associates a human-readable label with a specific position in the source
/// code, used to highlight relevant parts of code in error messages.
#[derive(Clone, Debug)]
pub struct LabelField {
    /// The source position range where this label applies
    pub position: Range<usize>,
    /// The descriptive label text
    pub label: String,
}

/// Core trait for O compiler diagnostic types, providing rich diagnostic
/// information:
/// - Source code labels and positions
/// - Nested errors and references to other errors
/// - Help text and error codes
/// - Source code context
///
/// Implemented via the `#[derive(OError)]` macro.
pub trait DiagnosticInfo: Display {
    /// Returns labeled fields that highlight specific parts of the source code
    fn labels(&self) -> Option<Vec<LabelField>>;

    /// Returns an iterator over nested errors contained within this error
    fn errors<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn DiagnosticInfo> + 'a>>;

    /// Returns references to other related errors
    fn references(&self) -> Option<Vec<Box<&dyn DiagnosticInfo>>>;

    /// Returns the source code context for this error
    fn source_code(&self) -> Option<Box<crate::SourceCode>> { None }

    /// Returns an optional error code for this error type
    fn error_code(&self) -> Option<Box<dyn Display>> { None }

    /// Returns optional help text to assist in resolving this error
    fn help(&self) -> Option<Box<dyn Display>> { None }
}
