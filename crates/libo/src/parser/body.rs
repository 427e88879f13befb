//! `Body := BodyElem*`, `BodyElem := FieldDecl | Statement | Expression`
//! (spec.md §4.3).

use crate::ast::{Body, BodyElement};
use crate::error::OErrorKind;
use crate::token::{Keyword, Operator};

use super::{expression, member, statement, Cursor};

pub(super) fn parse_body(cursor: &mut Cursor<'_>, terminators: &[Keyword]) -> Result<Body, OErrorKind> {
    let mut elements = Vec::new();
    while !terminators.iter().any(|keyword| cursor.peek_keyword(*keyword)) {
        if cursor.is_eof() {
            let expected = terminators.iter().map(|keyword| format!("'{keyword}'")).collect::<Vec<_>>().join(" or ");
            return Err(cursor.error_unexpected(expected));
        }
        elements.push(parse_body_element(cursor)?);
    }
    Ok(Body { elements })
}

fn parse_body_element(cursor: &mut Cursor<'_>) -> Result<BodyElement, OErrorKind> {
    if cursor.peek_keyword(Keyword::Var) {
        return Ok(BodyElement::LocalField(member::parse_field(cursor)?));
    }
    if cursor.peek_keyword(Keyword::While) || cursor.peek_keyword(Keyword::If) || cursor.peek_keyword(Keyword::Return) {
        return Ok(BodyElement::Statement(statement::parse_statement(cursor)?));
    }
    if cursor.is_identifier() && cursor.peek_next_operator(Operator::Assign) {
        return Ok(BodyElement::Statement(statement::parse_assignment(cursor)?));
    }
    Ok(BodyElement::Expression(expression::parse_expression(cursor)?))
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::file::SourceFile;
    use crate::lexer::tokenize;

    #[test]
    fn mixes_locals_statements_and_trailing_expression() {
        let file = SourceFile::new(
            "t.o",
            "class Main is \
             method Run: Integer is \
             var total: Integer(0) \
             total := total.Plus(1) \
             return total \
             end \
             end",
        );
        let tokens = tokenize(&file).unwrap();
        let program = parse(&tokens, &file).unwrap();
        let method = match &program.classes[0].members[0] {
            crate::ast::Member::Method(method) => method,
            _ => panic!("expected a method"),
        };
        assert_eq!(method.body.elements.len(), 3);
        assert!(method.body.elements[0].is_local_field());
        assert!(method.body.elements[1].is_statement());
        assert!(method.body.elements[2].is_statement());
    }
}
