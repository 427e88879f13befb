//! `ClassDecl := 'class' ClassName Extension 'is' ClassBody 'end'`
//! (spec.md §4.3), grounded in the teacher's `context(...)`/`cut(...)`
//! idiom for precise syntax errors (`parser/class.rs`).

use crate::ast::ClassDeclaration;
use crate::error::OErrorKind;
use crate::token::Keyword;

use super::{member, Cursor};

pub(super) fn parse_class_declaration(cursor: &mut Cursor<'_>) -> Result<ClassDeclaration, OErrorKind> {
    let position = cursor.current().position.clone();
    cursor.expect_keyword(Keyword::Class)?;

    let name = cursor.parse_class_name()?;

    let base_name = if cursor.peek_keyword(Keyword::Extends) {
        cursor.advance();
        Some(cursor.expect_identifier()?)
    } else {
        None
    };

    cursor.expect_keyword(Keyword::Is)?;

    let mut members = Vec::new();
    while !cursor.peek_keyword(Keyword::End) {
        if cursor.is_eof() {
            return Err(cursor.error_unexpected("'end'"));
        }
        members.push(member::parse_member(cursor)?);
    }
    cursor.expect_keyword(Keyword::End)?;

    Ok(ClassDeclaration {
        index: cursor.indexer.next(),
        name,
        base_name,
        members,
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::file::SourceFile;
    use crate::lexer::tokenize;

    #[test]
    fn parses_extends_clause() {
        let file = SourceFile::new("t.o", "class Dog extends Animal is end");
        let tokens = tokenize(&file).unwrap();
        let program = parse(&tokens, &file).unwrap();
        assert_eq!(program.classes[0].base_name.as_ref().unwrap().text.as_ref(), "Animal");
    }
}
