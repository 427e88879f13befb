//! O Language Compiler Core
//!
//! This is the core library for the O programming language compiler. It is a
//! single-threaded, purely computational pipeline: lexer, parser, semantic
//! checker, and optimizer, each a distinct stage that consumes the previous
//! stage's output and (except for the optimizer) may contribute to a shared
//! [`diagnostics::DiagnosticsBag`].
//!
//! # Architecture
//!
//! - [`lexer`]: source bytes to a flat token stream
//! - [`parser`]: token stream to an [`ast::Program`]
//! - [`hierarchy`]: the [`hierarchy::ClassHierarchy`] built during checking
//! - [`checker`]: the six-pass Semantic Checker, producing [`checker::Annotations`]
//! - [`optimizer`]: constant folding, dead-code elimination, call normalization
//! - [`diagnostics`] / [`error`]: the error taxonomy and diagnostic rendering
//!
//! # Usage
//!
//! The entry point is [`compile`]:
//!
//! ```ignore
//! use libo::{compile, file::SourceFile};
//!
//! let source = SourceFile::new("main.o", "class Main is this() is end end");
//! let output = compile(&source);
//! if output.diagnostics.has_errors() {
//!     for diagnostic in output.diagnostics.entries() {
//!         eprintln!("{diagnostic}");
//!     }
//! }
//! ```

pub mod ast;
pub mod checker;
pub mod diagnostics;
pub mod error;
pub mod file;
pub mod hierarchy;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod position;
pub mod scope;
pub mod token;
pub mod types;

use ast::Program;
use checker::Annotations;
use diagnostics::DiagnosticsBag;
use file::SourceFile;
use hierarchy::ClassHierarchy;

/// The Back-end Interface (spec.md §4.8): everything a (currently excluded)
/// code generator would consume after a successful compile. `program` and
/// `hierarchy` reflect the optimized tree when optimization ran; `program`
/// is `None` on a lex/parse failure, since there is no AST to report.
pub struct CompileOutput {
    pub program: Option<Program>,
    pub hierarchy: Option<ClassHierarchy>,
    pub annotations: Annotations,
    pub diagnostics: DiagnosticsBag,
}

impl CompileOutput {
    pub fn succeeded(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Runs the full pipeline over `file`'s source text: lex, parse, check, and
/// (only if the Diagnostics bag is error-free) optimize (spec.md §7
/// "Optimizer and back-end run only when the Diagnostics bag contains no
/// errors"). Lexical and syntax errors are fatal at their phase (spec.md §7):
/// a `LexError`/`SyntaxError` stops the pipeline immediately with no AST.
pub fn compile(file: &SourceFile) -> CompileOutput {
    let mut diagnostics = DiagnosticsBag::new();

    let tokens = match lexer::tokenize(file) {
        Ok(tokens) => tokens,
        Err(error) => {
            diagnostics.push_error(&error);
            return CompileOutput {
                program: None,
                hierarchy: None,
                annotations: Annotations::default(),
                diagnostics,
            };
        }
    };

    let program = match parser::parse(&tokens, file) {
        Ok(program) => program,
        Err(error) => {
            diagnostics.push_error(&error);
            return CompileOutput {
                program: None,
                hierarchy: None,
                annotations: Annotations::default(),
                diagnostics,
            };
        }
    };

    // Lexing and parsing already succeeded, so `diagnostics` is still empty
    // here; the Checker's bag becomes the compile's full diagnostic set.
    let (hierarchy, annotations, diagnostics) = checker::check(&program, file);

    let program = if diagnostics.has_errors() { program } else { optimizer::optimize(&program, &hierarchy) };

    CompileOutput {
        program: Some(program),
        hierarchy: Some(hierarchy),
        annotations,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_minimal_well_formed_class() {
        let file = SourceFile::new("main.o", "class Main is this() is var x : Integer(10) end end");
        let output = compile(&file);
        assert!(output.succeeded(), "unexpected diagnostics: {:?}", output.diagnostics.entries());
        assert!(output.hierarchy.unwrap().contains("Main"));
    }

    #[test]
    fn stops_at_a_syntax_error_with_no_program() {
        let file = SourceFile::new("main.o", "class Main is");
        let output = compile(&file);
        assert!(output.diagnostics.has_errors());
        assert!(output.program.is_none());
    }

    #[test]
    fn reports_unknown_base_and_still_optimizes_nothing() {
        let file = SourceFile::new("main.o", "class A extends Nope is this() is end end");
        let output = compile(&file);
        assert!(output.diagnostics.entries().iter().any(|d| d.kind == "UnknownBase"));
    }
}
