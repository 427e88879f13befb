//! Error taxonomy for the O compiler (spec.md §7 "Error taxonomy").
//!
//! Each kind is its own struct carrying the fields that message needs, unified
//! under [`OErrorKind`]. Rich diagnostic data (labels, help, source code) is
//! derived via `#[derive(OError)]` for the `CodespanReportGenerator`; the
//! plain `file:line:col` wire format required by spec.md §6 is produced by
//! [`crate::diagnostics::Diagnostic`]'s `Display`, not by these types directly.

use std::ops::Range;

use libo_macros::OError;
use libo_macros_core::SourceCode;

use crate::file::SourceFile;
use crate::position::SourcePosition;

fn label_range(file: &SourceFile, position: &SourcePosition) -> Range<usize> {
    let offset = file.byte_offset(position.line, position.column);
    offset..offset
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("unexpected character '{character}'")]
#[diagnostic(code("o::error::lex_error"))]
pub struct LexError {
    pub character: char,
    #[label("unexpected character here")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("unexpected {found}{}", expected.as_ref().map(|e| format!("; expected {e}")).unwrap_or_default())]
#[diagnostic(code("o::error::syntax_error"))]
pub struct SyntaxError {
    pub found: String,
    pub expected: Option<String>,
    #[label("unexpected token here")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("duplicate class '{name}'")]
#[diagnostic(code("o::error::duplicate_class"))]
pub struct DuplicateClass {
    pub name: String,
    #[label("first declared here")]
    pub old_span: Range<usize>,
    #[label("redeclared here")]
    pub new_span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("class '{class_name}' extends unknown class '{base_name}'")]
#[diagnostic(code("o::error::unknown_base"))]
pub struct UnknownBase {
    pub class_name: String,
    pub base_name: String,
    #[label("base class not found")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("cyclic inheritance involving class '{class_name}'")]
#[diagnostic(code("o::error::cyclic_inheritance"))]
pub struct CyclicInheritance {
    pub class_name: String,
    #[label("inheritance cycle passes through here")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("duplicate field '{field_name}' on class '{class_name}'")]
#[diagnostic(code("o::error::duplicate_field"))]
pub struct DuplicateField {
    pub class_name: String,
    pub field_name: String,
    #[label("first declared here")]
    pub old_span: Range<usize>,
    #[label("redeclared here")]
    pub new_span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("duplicate method '{method_name}' on class '{class_name}'")]
#[diagnostic(code("o::error::duplicate_method"))]
pub struct DuplicateMethod {
    pub class_name: String,
    pub method_name: String,
    #[label("first declared here")]
    pub old_span: Range<usize>,
    #[label("redeclared here")]
    pub new_span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("duplicate constructor on class '{class_name}'")]
#[diagnostic(code("o::error::duplicate_constructor"))]
pub struct DuplicateConstructor {
    pub class_name: String,
    #[label("first declared here")]
    pub old_span: Range<usize>,
    #[label("redeclared here")]
    pub new_span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("unknown type '{type_name}'")]
#[diagnostic(code("o::error::unknown_type"))]
pub struct UnknownType {
    pub type_name: String,
    #[label("type is not declared")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("unknown identifier '{name}'")]
#[diagnostic(code("o::error::unknown_identifier"))]
pub struct UnknownIdentifier {
    pub name: String,
    #[label("not a visible local, parameter, or field")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("unknown member '{member_name}' on type '{receiver_type}'")]
#[diagnostic(code("o::error::unknown_member"))]
pub struct UnknownMember {
    pub receiver_type: String,
    pub member_name: String,
    #[label("no such field or method")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("ambiguous call to '{method_name}' on type '{receiver_type}'")]
#[diagnostic(code("o::error::ambiguous_call"))]
pub struct AmbiguousCall {
    pub receiver_type: String,
    pub method_name: String,
    #[label("more than one method matches these arguments")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("type mismatch: expected '{expected}', found '{found}'")]
#[diagnostic(code("o::error::type_mismatch"))]
pub struct TypeMismatch {
    pub expected: String,
    pub found: String,
    #[label("value of the wrong type here")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("method '{method_name}' is missing a return on some exit path")]
#[diagnostic(code("o::error::missing_return"))]
pub struct MissingReturn {
    pub method_name: String,
    #[label("method declared here")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("method '{method_name}' has no return type but returns a value")]
#[diagnostic(code("o::error::unexpected_return_value"))]
pub struct UnexpectedReturnValue {
    pub method_name: String,
    #[label("return with a value here")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

#[derive(Clone, Debug, OError, thiserror::Error)]
#[error("internal error: {message}")]
#[diagnostic(code("o::error::internal_error"))]
pub struct InternalError {
    pub message: String,
    #[label("while processing here")]
    pub span: Range<usize>,
    pub position: SourcePosition,
    #[source_code]
    pub code: SourceCode,
}

/// Unified error kind, one variant per spec.md §7 taxonomy entry.
#[derive(Clone, Debug, OError, thiserror::Error)]
pub enum OErrorKind {
    #[error(transparent)]
    #[diagnostic(transparent)]
    LexError(Box<LexError>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    SyntaxError(Box<SyntaxError>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    DuplicateClass(Box<DuplicateClass>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownBase(Box<UnknownBase>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    CyclicInheritance(Box<CyclicInheritance>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    DuplicateField(Box<DuplicateField>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    DuplicateMethod(Box<DuplicateMethod>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    DuplicateConstructor(Box<DuplicateConstructor>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownType(Box<UnknownType>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownIdentifier(Box<UnknownIdentifier>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownMember(Box<UnknownMember>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    AmbiguousCall(Box<AmbiguousCall>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    TypeMismatch(Box<TypeMismatch>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    MissingReturn(Box<MissingReturn>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnexpectedReturnValue(Box<UnexpectedReturnValue>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    InternalError(Box<InternalError>),
}

impl OErrorKind {
    /// The canonical kind name used in the spec.md §6 wire format and as
    /// the `#[diagnostic(code)]` suffix.
    pub fn kind_name(&self) -> &'static str {
        match self {
            OErrorKind::LexError(_) => "LexError",
            OErrorKind::SyntaxError(_) => "SyntaxError",
            OErrorKind::DuplicateClass(_) => "DuplicateClass",
            OErrorKind::UnknownBase(_) => "UnknownBase",
            OErrorKind::CyclicInheritance(_) => "CyclicInheritance",
            OErrorKind::DuplicateField(_) => "DuplicateField",
            OErrorKind::DuplicateMethod(_) => "DuplicateMethod",
            OErrorKind::DuplicateConstructor(_) => "DuplicateConstructor",
            OErrorKind::UnknownType(_) => "UnknownType",
            OErrorKind::UnknownIdentifier(_) => "UnknownIdentifier",
            OErrorKind::UnknownMember(_) => "UnknownMember",
            OErrorKind::AmbiguousCall(_) => "AmbiguousCall",
            OErrorKind::TypeMismatch(_) => "TypeMismatch",
            OErrorKind::MissingReturn(_) => "MissingReturn",
            OErrorKind::UnexpectedReturnValue(_) => "UnexpectedReturnValue",
            OErrorKind::InternalError(_) => "InternalError",
        }
    }

    /// The primary source position to anchor this diagnostic on.
    pub fn position(&self) -> SourcePosition {
        match self {
            OErrorKind::LexError(e) => e.position.clone(),
            OErrorKind::SyntaxError(e) => e.position.clone(),
            OErrorKind::DuplicateClass(e) => e.position.clone(),
            OErrorKind::UnknownBase(e) => e.position.clone(),
            OErrorKind::CyclicInheritance(e) => e.position.clone(),
            OErrorKind::DuplicateField(e) => e.position.clone(),
            OErrorKind::DuplicateMethod(e) => e.position.clone(),
            OErrorKind::DuplicateConstructor(e) => e.position.clone(),
            OErrorKind::UnknownType(e) => e.position.clone(),
            OErrorKind::UnknownIdentifier(e) => e.position.clone(),
            OErrorKind::UnknownMember(e) => e.position.clone(),
            OErrorKind::AmbiguousCall(e) => e.position.clone(),
            OErrorKind::TypeMismatch(e) => e.position.clone(),
            OErrorKind::MissingReturn(e) => e.position.clone(),
            OErrorKind::UnexpectedReturnValue(e) => e.position.clone(),
            OErrorKind::InternalError(e) => e.position.clone(),
        }
    }

    pub fn lex_error(character: char, position: SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::LexError(
            LexError {
                character,
                span: label_range(file, &position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn syntax_error(found: String, expected: Option<String>, position: SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::SyntaxError(
            SyntaxError {
                found,
                expected,
                span: label_range(file, &position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn duplicate_class(name: String, old_position: &SourcePosition, new_position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::DuplicateClass(
            DuplicateClass {
                name,
                old_span: label_range(file, old_position),
                new_span: label_range(file, new_position),
                position: new_position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn unknown_base(class_name: String, base_name: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::UnknownBase(
            UnknownBase {
                class_name,
                base_name,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn cyclic_inheritance(class_name: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::CyclicInheritance(
            CyclicInheritance {
                class_name,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn duplicate_field(
        class_name: String,
        field_name: String,
        old_position: &SourcePosition,
        new_position: &SourcePosition,
        file: &SourceFile,
    ) -> Self {
        OErrorKind::DuplicateField(
            DuplicateField {
                class_name,
                field_name,
                old_span: label_range(file, old_position),
                new_span: label_range(file, new_position),
                position: new_position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn duplicate_method(
        class_name: String,
        method_name: String,
        old_position: &SourcePosition,
        new_position: &SourcePosition,
        file: &SourceFile,
    ) -> Self {
        OErrorKind::DuplicateMethod(
            DuplicateMethod {
                class_name,
                method_name,
                old_span: label_range(file, old_position),
                new_span: label_range(file, new_position),
                position: new_position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn duplicate_constructor(class_name: String, old_position: &SourcePosition, new_position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::DuplicateConstructor(
            DuplicateConstructor {
                class_name,
                old_span: label_range(file, old_position),
                new_span: label_range(file, new_position),
                position: new_position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn unknown_type(type_name: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::UnknownType(
            UnknownType {
                type_name,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn unknown_identifier(name: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::UnknownIdentifier(
            UnknownIdentifier {
                name,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn unknown_member(receiver_type: String, member_name: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::UnknownMember(
            UnknownMember {
                receiver_type,
                member_name,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn ambiguous_call(receiver_type: String, method_name: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::AmbiguousCall(
            AmbiguousCall {
                receiver_type,
                method_name,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn type_mismatch(expected: String, found: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::TypeMismatch(
            TypeMismatch {
                expected,
                found,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn missing_return(method_name: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::MissingReturn(
            MissingReturn {
                method_name,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn unexpected_return_value(method_name: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::UnexpectedReturnValue(
            UnexpectedReturnValue {
                method_name,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }

    pub fn internal_error(message: String, position: &SourcePosition, file: &SourceFile) -> Self {
        OErrorKind::InternalError(
            InternalError {
                message,
                span: label_range(file, position),
                position: position.clone(),
                code: file.into(),
            }
            .into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_name_matches_taxonomy_string() {
        let file = SourceFile::new("t.o", "class Foo is end");
        let error = OErrorKind::unknown_type("Bar".into(), &SourcePosition::new(1, 1, &file), &file);
        assert_eq!(error.kind_name(), "UnknownType");
    }
}
