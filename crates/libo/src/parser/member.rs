//! `Member := FieldDecl | MethodDecl | CtorDecl` and their shared
//! `OptParams`/`Params`/`Param` productions (spec.md §4.3).

use crate::ast::{ClassName, ConstructorDeclaration, FieldDeclaration, Member, MethodDeclaration, MethodHeader, Parameter};
use crate::error::OErrorKind;
use crate::token::{Bracket, Keyword, Operator};

use super::{body, expression, Cursor};

pub(super) fn parse_member(cursor: &mut Cursor<'_>) -> Result<Member, OErrorKind> {
    if cursor.peek_keyword(Keyword::Var) {
        return Ok(Member::Field(parse_field(cursor)?));
    }
    if cursor.peek_keyword(Keyword::Method) {
        return Ok(Member::Method(parse_method(cursor)?));
    }
    if cursor.peek_keyword(Keyword::This) {
        return Ok(Member::Constructor(parse_constructor(cursor)?));
    }
    Err(cursor.error_unexpected("'var', 'method', or 'this'"))
}

/// `FieldDecl := 'var' IDENT ':' Expression`
pub(super) fn parse_field(cursor: &mut Cursor<'_>) -> Result<FieldDeclaration, OErrorKind> {
    cursor.expect_keyword(Keyword::Var)?;
    let name = cursor.expect_identifier()?;
    cursor.expect_operator(Operator::Colon)?;
    let initializer = expression::parse_expression(cursor)?;
    Ok(FieldDeclaration { name, initializer })
}

/// `MethodDecl := 'method' IDENT OptParams OptReturnType OptMethodBody`
fn parse_method(cursor: &mut Cursor<'_>) -> Result<MethodDeclaration, OErrorKind> {
    cursor.expect_keyword(Keyword::Method)?;
    let name = cursor.expect_identifier()?;
    let parameters = parse_opt_params(cursor)?;

    let return_type = if cursor.peek_operator(Operator::Colon) {
        cursor.advance();
        let ident = cursor.expect_identifier()?;
        Some(ClassName { name: ident, generic_parameter: None })
    } else {
        None
    };

    let header = MethodHeader { name, parameters, return_type };

    // `OptMethodBody := ε | 'is' Body 'end' | '=>' Expression`
    let body = if cursor.peek_keyword(Keyword::Is) {
        cursor.advance();
        let body = body::parse_body(cursor, &[Keyword::End])?;
        cursor.expect_keyword(Keyword::End)?;
        body
    } else if cursor.peek_operator(Operator::Arrow) {
        // `=>` sugar for `is return <expr> end` (spec.md §4.3).
        cursor.advance();
        let expression = expression::parse_expression(cursor)?;
        let position = expression.position().clone();
        crate::ast::Body {
            elements: vec![crate::ast::BodyElement::Statement(crate::ast::Statement::Return(crate::ast::ReturnStatement {
                expression: Some(expression),
                position,
            }))],
        }
    } else {
        crate::ast::Body::default()
    };

    Ok(MethodDeclaration { header, body })
}

/// `CtorDecl := 'this' OptParams 'is' Body 'end'`
fn parse_constructor(cursor: &mut Cursor<'_>) -> Result<ConstructorDeclaration, OErrorKind> {
    let position = cursor.current().position.clone();
    cursor.expect_keyword(Keyword::This)?;
    let parameters = parse_opt_params(cursor)?;
    cursor.expect_keyword(Keyword::Is)?;
    let body = body::parse_body(cursor, &[Keyword::End])?;
    cursor.expect_keyword(Keyword::End)?;
    Ok(ConstructorDeclaration { parameters, body, position })
}

/// `OptParams := ε | '(' Params ')'`, `Params := Param (',' Param)*`,
/// `Param := IDENT ':' ClassName`
fn parse_opt_params(cursor: &mut Cursor<'_>) -> Result<Vec<Parameter>, OErrorKind> {
    if !cursor.peek_bracket(Bracket::LeftParen) {
        return Ok(Vec::new());
    }
    cursor.advance();

    let mut parameters = Vec::new();
    if !cursor.peek_bracket(Bracket::RightParen) {
        loop {
            let name = cursor.expect_identifier()?;
            cursor.expect_operator(Operator::Colon)?;
            let type_name = cursor.parse_class_name()?;
            parameters.push(Parameter { name, type_name });

            if cursor.peek_operator(Operator::Comma) {
                cursor.advance();
                continue;
            }
            break;
        }
    }

    cursor.expect_bracket(Bracket::RightParen)?;
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::ast::Member;
    use crate::file::SourceFile;
    use crate::lexer::tokenize;

    fn parse_source(code: &str) -> crate::ast::Program {
        let file = SourceFile::new("t.o", code);
        let tokens = tokenize(&file).unwrap();
        parse(&tokens, &file).unwrap()
    }

    #[test]
    fn parses_field_method_and_constructor() {
        let program = parse_source(
            "class Point is \
             var x: Integer(0) \
             this(a: Integer) is x := a end \
             method Sum: Integer => x \
             end",
        );
        let members = &program.classes[0].members;
        assert_eq!(members.len(), 3);
        assert!(members[0].is_field());
        assert!(members[1].is_constructor());
        assert!(members[2].is_method());
        if let Member::Method(method) = &members[2] {
            assert_eq!(method.header.return_type.as_ref().unwrap().name.text.as_ref(), "Integer");
        }
    }

    #[test]
    fn arrow_body_desugars_to_return() {
        let program = parse_source("class Main is method Zero: Integer => 0 end");
        if let Member::Method(method) = &program.classes[0].members[0] {
            assert_eq!(method.body.elements.len(), 1);
            assert!(method.body.elements[0].is_statement());
        } else {
            panic!("expected a method");
        }
    }
}
