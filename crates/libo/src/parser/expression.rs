//! `Expression := Primary | CtorInvoc | FunCall | MemberAccess` (spec.md
//! §4.3).
//!
//! The O grammar has no infix operators, so this is a single postfix-suffix
//! loop over a `Primary`: `.IDENT` builds a `MemberAccess`, `(Args)` builds a
//! `FunctionalCall`. Disambiguating a constructor call from a plain function
//! call is not this parser's job for the bare-identifier case (spec.md §4.7
//! "Call normalization" rewrites those after the fact); the only form this
//! parser resolves directly is a class name carrying an explicit `[...]`
//! generic parameter, which cannot be confused with a plain identifier call.

use crate::ast::{BooleanLiteral, CallCallee, ConstructorInvocation, Expression, FunctionalCall, IdentifierExpression, IntegerLiteral, MemberAccess, RealLiteral};
use crate::error::OErrorKind;
use crate::token::{Bracket, Keyword, Operator, TokenKind};

use super::Cursor;

pub(super) fn parse_expression(cursor: &mut Cursor<'_>) -> Result<Expression, OErrorKind> {
    let mut expression = parse_primary(cursor)?;

    loop {
        if cursor.peek_operator(Operator::Dot) {
            cursor.advance();
            let member = cursor.expect_identifier()?;
            let position = member.position.clone();
            expression = Expression::MemberAccess(MemberAccess {
                index: cursor.indexer.next(),
                target: Box::new(expression),
                member,
                position,
            });
            continue;
        }

        if cursor.peek_bracket(Bracket::LeftParen) {
            let position = expression.position().clone();
            let arguments = parse_arguments(cursor)?;
            let callee = match expression {
                Expression::IdentifierExpression(identifier) => CallCallee::Identifier(identifier),
                Expression::MemberAccess(member_access) => CallCallee::MemberAccess(member_access),
                _ => return Err(cursor.error_unexpected("a callable identifier or member access")),
            };
            expression = Expression::FunctionalCall(FunctionalCall {
                index: cursor.indexer.next(),
                callee: Box::new(callee),
                arguments,
                position,
            });
            continue;
        }

        break;
    }

    Ok(expression)
}

/// `Primary := INT | REAL | BOOL | 'this' | IDENT`, plus the one case this
/// parser resolves as a `CtorInvoc` directly: a class name carrying an
/// explicit generic parameter (`Array[Integer](5)`).
fn parse_primary(cursor: &mut Cursor<'_>) -> Result<Expression, OErrorKind> {
    if cursor.is_identifier() && cursor.peek_next_bracket(Bracket::LeftSquare) {
        let position = cursor.current().position.clone();
        let class_name = cursor.parse_class_name()?;
        let arguments = parse_arguments(cursor)?;
        return Ok(Expression::ConstructorInvocation(ConstructorInvocation {
            index: cursor.indexer.next(),
            class_name,
            arguments,
            position,
        }));
    }

    let position = cursor.current().position.clone();
    match cursor.current().kind.clone() {
        TokenKind::IntegerLiteral(lexeme) => {
            cursor.advance();
            let value: i64 = lexeme
                .parse()
                .map_err(|_| OErrorKind::internal_error(format!("malformed integer literal '{lexeme}'"), &position, cursor.file()))?;
            Ok(Expression::IntegerLiteral(IntegerLiteral { index: cursor.indexer.next(), value, position }))
        }
        TokenKind::RealLiteral(lexeme) => {
            cursor.advance();
            let value: f64 = lexeme
                .parse()
                .map_err(|_| OErrorKind::internal_error(format!("malformed real literal '{lexeme}'"), &position, cursor.file()))?;
            Ok(Expression::RealLiteral(RealLiteral { index: cursor.indexer.next(), value, position }))
        }
        TokenKind::BooleanLiteral(value) => {
            cursor.advance();
            Ok(Expression::BooleanLiteral(BooleanLiteral { index: cursor.indexer.next(), value, position }))
        }
        TokenKind::Keyword(Keyword::This) => {
            cursor.advance();
            Ok(Expression::ThisExpression { index: cursor.indexer.next(), position })
        }
        TokenKind::Identifier(_) => {
            let name = cursor.expect_identifier()?;
            Ok(Expression::IdentifierExpression(IdentifierExpression { index: cursor.indexer.next(), name }))
        }
        _ => Err(cursor.error_unexpected("an expression")),
    }
}

/// `Arguments := '(' (Expression (',' Expression)*)? ')'`
fn parse_arguments(cursor: &mut Cursor<'_>) -> Result<Vec<Expression>, OErrorKind> {
    cursor.expect_bracket(Bracket::LeftParen)?;

    let mut arguments = Vec::new();
    if !cursor.peek_bracket(Bracket::RightParen) {
        loop {
            arguments.push(parse_expression(cursor)?);
            if cursor.peek_operator(Operator::Comma) {
                cursor.advance();
                continue;
            }
            break;
        }
    }

    cursor.expect_bracket(Bracket::RightParen)?;
    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::ast::{CallCallee, Expression};
    use crate::file::SourceFile;
    use crate::lexer::tokenize;

    fn field_initializer(code: &str) -> Expression {
        let file = SourceFile::new("t.o", code);
        let tokens = tokenize(&file).unwrap();
        let program = parse(&tokens, &file).unwrap();
        match &program.classes[0].members[0] {
            crate::ast::Member::Field(field) => field.initializer.clone(),
            _ => panic!("expected a field"),
        }
    }

    #[test]
    fn bare_identifier_call_is_a_functional_call_not_a_constructor() {
        let expression = field_initializer("class Main is var x: Point(1, 2) end");
        match expression {
            Expression::FunctionalCall(call) => {
                assert!(matches!(*call.callee, CallCallee::Identifier(_)));
                assert_eq!(call.arguments.len(), 2);
            }
            other => panic!("expected a functional call, got {other:?}"),
        }
    }

    #[test]
    fn bracketed_class_name_is_a_constructor_invocation() {
        let expression = field_initializer("class Main is var x: Array[Integer](5) end");
        match expression {
            Expression::ConstructorInvocation(invocation) => {
                assert_eq!(invocation.class_name.name.text.as_ref(), "Array");
                assert_eq!(invocation.arguments.len(), 1);
            }
            other => panic!("expected a constructor invocation, got {other:?}"),
        }
    }

    #[test]
    fn chained_member_access_and_call() {
        let expression = field_initializer("class Main is var x: this.Balance.Plus(1) end");
        match expression {
            Expression::FunctionalCall(call) => assert!(matches!(*call.callee, CallCallee::MemberAccess(_))),
            other => panic!("expected a functional call, got {other:?}"),
        }
    }
}
