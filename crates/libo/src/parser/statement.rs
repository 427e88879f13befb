//! `Statement := Assignment | WhileLoop | IfStatement | Return` (spec.md
//! §4.3).

use crate::ast::{Assignment, IfStatement, ReturnStatement, Statement, WhileLoop};
use crate::error::OErrorKind;
use crate::token::{Keyword, Operator, TokenKind};

use super::{body, expression, Cursor};

pub(super) fn parse_statement(cursor: &mut Cursor<'_>) -> Result<Statement, OErrorKind> {
    if cursor.peek_keyword(Keyword::While) {
        return Ok(Statement::WhileLoop(parse_while(cursor)?));
    }
    if cursor.peek_keyword(Keyword::If) {
        return Ok(Statement::IfStatement(parse_if(cursor)?));
    }
    if cursor.peek_keyword(Keyword::Return) {
        return Ok(Statement::Return(parse_return(cursor)?));
    }
    parse_assignment(cursor).map(Statement::Assignment)
}

/// `Assignment := IDENT ':=' Expression`
pub(super) fn parse_assignment(cursor: &mut Cursor<'_>) -> Result<Assignment, OErrorKind> {
    let target = cursor.expect_identifier()?;
    cursor.expect_operator(Operator::Assign)?;
    let expression = expression::parse_expression(cursor)?;
    Ok(Assignment { target, expression })
}

/// `WhileLoop := 'while' Expression 'loop' Body 'end'`
fn parse_while(cursor: &mut Cursor<'_>) -> Result<WhileLoop, OErrorKind> {
    cursor.expect_keyword(Keyword::While)?;
    let condition = expression::parse_expression(cursor)?;
    cursor.expect_keyword(Keyword::Loop)?;
    let body = body::parse_body(cursor, &[Keyword::End])?;
    cursor.expect_keyword(Keyword::End)?;
    Ok(WhileLoop { condition, body })
}

/// `IfStatement := 'if' Expression 'then' Body ('else' Body)? 'end'`
fn parse_if(cursor: &mut Cursor<'_>) -> Result<IfStatement, OErrorKind> {
    cursor.expect_keyword(Keyword::If)?;
    let condition = expression::parse_expression(cursor)?;
    cursor.expect_keyword(Keyword::Then)?;
    let then_body = body::parse_body(cursor, &[Keyword::Else, Keyword::End])?;

    let else_body = if cursor.peek_keyword(Keyword::Else) {
        cursor.advance();
        Some(body::parse_body(cursor, &[Keyword::End])?)
    } else {
        None
    };

    cursor.expect_keyword(Keyword::End)?;
    Ok(IfStatement { condition, then_body, else_body })
}

/// `Return := 'return' Expression?`
fn parse_return(cursor: &mut Cursor<'_>) -> Result<ReturnStatement, OErrorKind> {
    let position = cursor.current().position.clone();
    cursor.expect_keyword(Keyword::Return)?;

    let expression = if starts_expression(cursor) {
        Some(expression::parse_expression(cursor)?)
    } else {
        None
    };

    Ok(ReturnStatement { expression, position })
}

/// A bare `return` is followed either by a token that can start an
/// `Expression` or by whatever terminates the enclosing body.
fn starts_expression(cursor: &Cursor<'_>) -> bool {
    matches!(
        &cursor.current().kind,
        TokenKind::IntegerLiteral(_) | TokenKind::RealLiteral(_) | TokenKind::BooleanLiteral(_) | TokenKind::Identifier(_)
    ) || cursor.peek_keyword(Keyword::This)
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::ast::{Member, Statement};
    use crate::file::SourceFile;
    use crate::lexer::tokenize;

    fn method_body(code: &str) -> crate::ast::Body {
        let file = SourceFile::new("t.o", code);
        let tokens = tokenize(&file).unwrap();
        let program = parse(&tokens, &file).unwrap();
        match &program.classes[0].members[0] {
            Member::Method(method) => method.body.clone(),
            _ => panic!("expected a method"),
        }
    }

    #[test]
    fn parses_while_loop() {
        let body = method_body("class Main is method Run is while true loop return end end end");
        assert_eq!(body.elements.len(), 1);
        assert!(matches!(&body.elements[0], crate::ast::BodyElement::Statement(Statement::WhileLoop(_))));
    }

    #[test]
    fn parses_if_else() {
        let body = method_body("class Main is method Run is if true then return else return end end end");
        assert!(matches!(&body.elements[0], crate::ast::BodyElement::Statement(Statement::IfStatement(stmt)) if stmt.else_body.is_some()));
    }

    #[test]
    fn bare_return_has_no_expression() {
        let body = method_body("class Main is method Run is return end end");
        match &body.elements[0] {
            crate::ast::BodyElement::Statement(Statement::Return(stmt)) => assert!(stmt.expression.is_none()),
            _ => panic!("expected a return statement"),
        }
    }
}
