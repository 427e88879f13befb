//! Recursive-descent parser over a pre-lexed token stream (spec.md §4.3).
//!
//! Unlike the teacher's combined nom-combinator lex+parse pass
//! (`parser/expression.rs`'s precedence-climbing operator hierarchy), this
//! parser walks a `Vec<Token>` the [`crate::lexer`] already produced. The O
//! grammar has no infix operators at all: every `Expression` production is
//! `Primary | CtorInvoc | FunCall | MemberAccess`, so there is no precedence
//! table to climb, only a single postfix-suffix loop for `.member` and
//! `(args)`. The `context`/`cut` idiom from the teacher's `parser/class.rs`
//! (precise "expected X" messages) is kept, just expressed as cursor checks
//! instead of nom combinators.

mod body;
mod class;
mod expression;
mod member;
mod statement;

use std::rc::Rc;

use crate::ast::{AstIndexer, ClassName, Ident, Program};
use crate::error::OErrorKind;
use crate::file::SourceFile;
use crate::token::{Bracket, Keyword, Operator, Token, TokenKind};

pub(crate) struct Cursor<'t> {
    tokens: &'t [Token],
    position: usize,
    file: &'t SourceFile,
    pub(crate) indexer: AstIndexer,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token], file: &'t SourceFile) -> Self {
        Self {
            tokens,
            position: 0,
            file,
            indexer: AstIndexer::default(),
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) -> &Token {
        let token = &self.tokens[self.position];
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn is_eof(&self) -> bool {
        self.current().kind.is_end_of_file()
    }

    fn file(&self) -> &'t SourceFile {
        self.file
    }

    fn is_identifier(&self) -> bool {
        matches!(self.current().kind, TokenKind::Identifier(_))
    }

    fn peek_next_bracket(&self, bracket: Bracket) -> bool {
        matches!(self.tokens.get(self.position + 1).map(|token| &token.kind), Some(TokenKind::Bracket(found)) if *found == bracket)
    }

    fn peek_next_operator(&self, operator: Operator) -> bool {
        matches!(self.tokens.get(self.position + 1).map(|token| &token.kind), Some(TokenKind::Operator(found)) if *found == operator)
    }

    fn error_unexpected(&self, expected: impl Into<String>) -> OErrorKind {
        let found = self.current().kind.to_string();
        OErrorKind::syntax_error(found, Some(expected.into()), self.current().position.clone(), self.file)
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), OErrorKind> {
        match &self.current().kind {
            TokenKind::Keyword(found) if *found == keyword => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error_unexpected(format!("'{keyword}'"))),
        }
    }

    fn expect_operator(&mut self, operator: Operator) -> Result<(), OErrorKind> {
        match &self.current().kind {
            TokenKind::Operator(found) if *found == operator => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error_unexpected(format!("'{operator}'"))),
        }
    }

    fn expect_bracket(&mut self, bracket: Bracket) -> Result<(), OErrorKind> {
        match &self.current().kind {
            TokenKind::Bracket(found) if *found == bracket => {
                self.advance();
                Ok(())
            }
            _ => Err(self.error_unexpected(format!("'{bracket}'"))),
        }
    }

    fn peek_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current().kind, TokenKind::Keyword(found) if *found == keyword)
    }

    fn peek_operator(&self, operator: Operator) -> bool {
        matches!(&self.current().kind, TokenKind::Operator(found) if *found == operator)
    }

    fn peek_bracket(&self, bracket: Bracket) -> bool {
        matches!(&self.current().kind, TokenKind::Bracket(found) if *found == bracket)
    }

    fn expect_identifier(&mut self) -> Result<Ident, OErrorKind> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let text = name.clone();
                let position = self.current().position.clone();
                self.advance();
                Ok(Ident { text, position })
            }
            _ => Err(self.error_unexpected("an identifier")),
        }
    }

    /// `ClassName := IDENT Generic`, `Generic := ε | '[' ClassName ']'`
    /// (spec.md §4.3).
    fn parse_class_name(&mut self) -> Result<ClassName, OErrorKind> {
        let name = self.expect_identifier()?;
        let generic_parameter = if self.peek_bracket(Bracket::LeftSquare) {
            self.advance();
            let inner = self.parse_class_name()?;
            self.expect_bracket(Bracket::RightSquare)?;
            Some(Box::new(inner))
        } else {
            None
        };
        Ok(ClassName { name, generic_parameter })
    }
}

/// `Program := ClassDecl+ EOF` (spec.md §4.3).
pub fn parse(tokens: &[Token], file: &SourceFile) -> Result<Program, OErrorKind> {
    let mut cursor = Cursor::new(tokens, file);
    let mut classes = Vec::new();

    while !cursor.is_eof() {
        classes.push(Rc::new(class::parse_class_declaration(&mut cursor)?));
    }

    if classes.is_empty() {
        return Err(cursor.error_unexpected("at least one class declaration"));
    }

    Ok(Program { classes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(code: &str) -> Result<Program, OErrorKind> {
        let file = SourceFile::new("t.o", code);
        let tokens = tokenize(&file).unwrap();
        parse(&tokens, &file)
    }

    #[test]
    fn parses_minimal_class() {
        let program = parse_source("class Main is end").unwrap();
        assert_eq!(program.classes.len(), 1);
        assert_eq!(program.classes[0].name.name.text.as_ref(), "Main");
    }

    #[test]
    fn empty_program_is_a_syntax_error() {
        assert!(parse_source("").is_err());
    }

    #[test]
    fn missing_end_is_a_syntax_error() {
        assert!(parse_source("class Main is").is_err());
    }
}
