//! Tokenizer (spec.md §4.2 "Lexer").
//!
//! A genuinely separate pass from parsing, unlike the teacher's combined
//! nom-combinator lex+parse: scans the full source once into a `Vec<Token>`
//! before the Parser ever runs. Whitespace and `//` line comments are
//! skipped here and never reach the token stream.

use std::rc::Rc;

use crate::error::OErrorKind;
use crate::file::SourceFile;
use crate::position::SourcePosition;
use crate::token::{Bracket, Keyword, Operator, Token, TokenKind};

struct Cursor<'base> {
    chars: Vec<char>,
    offset: usize,
    line: u32,
    column: u32,
    file: &'base SourceFile,
}

impl<'base> Cursor<'base> {
    fn new(file: &'base SourceFile) -> Self {
        Self {
            chars: file.code().chars().collect(),
            offset: 0,
            line: 1,
            column: 1,
            file,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.offset + ahead).copied()
    }

    fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column, self.file)
    }

    /// Advances one character, tracking line/column (spec.md §4.2: only
    /// `\n` increments the line counter, `\r` alone is zero-width whitespace).
    fn bump(&mut self) -> Option<char> {
        let current = self.peek()?;
        self.offset += 1;
        if current == '\n' {
            self.line += 1;
            self.column = 1;
        } else if current != '\r' {
            self.column += 1;
        }
        Some(current)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }
}

/// Scans `file` into a token list terminated by an end-of-file token
/// (spec.md §4.2). Fails fast on the first unrecognized character.
pub fn tokenize(file: &SourceFile) -> Result<Vec<Token>, OErrorKind> {
    let mut cursor = Cursor::new(file);
    let mut tokens = Vec::new();

    loop {
        cursor.skip_trivia();
        let start = cursor.position();
        let Some(c) = cursor.peek() else {
            tokens.push(Token::new(TokenKind::EndOfFile, "", start));
            break;
        };

        if c == ':' && cursor.peek_at(1) == Some('=') {
            cursor.bump();
            cursor.bump();
            tokens.push(Token::new(TokenKind::Operator(Operator::Assign), ":=", start));
            continue;
        }
        if c == '=' && cursor.peek_at(1) == Some('>') {
            cursor.bump();
            cursor.bump();
            tokens.push(Token::new(TokenKind::Operator(Operator::Arrow), "=>", start));
            continue;
        }
        if let Some((operator, lexeme)) = single_char_operator(c) {
            cursor.bump();
            tokens.push(Token::new(TokenKind::Operator(operator), lexeme, start));
            continue;
        }
        if let Some((bracket, lexeme)) = single_char_bracket(c) {
            cursor.bump();
            tokens.push(Token::new(TokenKind::Bracket(bracket), lexeme, start));
            continue;
        }
        if c.is_ascii_digit() {
            tokens.push(scan_number(&mut cursor, start));
            continue;
        }
        if c.is_ascii_alphabetic() || c == '_' {
            tokens.push(scan_identifier(&mut cursor, start));
            continue;
        }

        return Err(OErrorKind::lex_error(c, start, file));
    }

    Ok(tokens)
}

fn single_char_operator(c: char) -> Option<(Operator, &'static str)> {
    Some(match c {
        ':' => (Operator::Colon, ":"),
        '.' => (Operator::Dot, "."),
        ',' => (Operator::Comma, ","),
        _ => return None,
    })
}

fn single_char_bracket(c: char) -> Option<(Bracket, &'static str)> {
    Some(match c {
        '(' => (Bracket::LeftParen, "("),
        ')' => (Bracket::RightParen, ")"),
        '[' => (Bracket::LeftSquare, "["),
        ']' => (Bracket::RightSquare, "]"),
        _ => return None,
    })
}

/// Numeric literal: digits, optionally followed by `.` and at least one
/// more digit to become a real (spec.md §4.2). A trailing `.` with no
/// fractional digit is left unconsumed.
fn scan_number(cursor: &mut Cursor<'_>, start: SourcePosition) -> Token {
    let mut lexeme = String::new();
    while let Some(c) = cursor.peek().filter(|c| c.is_ascii_digit()) {
        lexeme.push(c);
        cursor.bump();
    }

    if cursor.peek() == Some('.') && cursor.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
        lexeme.push('.');
        cursor.bump();
        while let Some(c) = cursor.peek().filter(|c| c.is_ascii_digit()) {
            lexeme.push(c);
            cursor.bump();
        }
        return Token::new(TokenKind::RealLiteral(Rc::from(lexeme.as_str())), lexeme, start);
    }

    Token::new(TokenKind::IntegerLiteral(Rc::from(lexeme.as_str())), lexeme, start)
}

/// Identifier, keyword, or `true`/`false` boolean literal (spec.md §4.2).
fn scan_identifier(cursor: &mut Cursor<'_>, start: SourcePosition) -> Token {
    let mut lexeme = String::new();
    while let Some(c) = cursor.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
        lexeme.push(c);
        cursor.bump();
    }

    if lexeme == "true" {
        return Token::new(TokenKind::BooleanLiteral(true), lexeme, start);
    }
    if lexeme == "false" {
        return Token::new(TokenKind::BooleanLiteral(false), lexeme, start);
    }
    if let Some(keyword) = Keyword::from_lexeme(&lexeme) {
        return Token::new(TokenKind::Keyword(keyword), lexeme, start);
    }

    Token::new(TokenKind::Identifier(Rc::from(lexeme.as_str())), lexeme, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(code: &str) -> Vec<TokenKind> {
        let file = SourceFile::new("t.o", code);
        tokenize(&file).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn skips_whitespace_and_line_comments() {
        let kinds = kinds("  var  // a comment\n  x");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Identifier(Rc::from("x")),
                TokenKind::EndOfFile,
            ]
        );
    }

    #[rstest]
    #[case("12", TokenKind::IntegerLiteral(Rc::from("12")))]
    #[case("12.5", TokenKind::RealLiteral(Rc::from("12.5")))]
    #[case("12.", TokenKind::IntegerLiteral(Rc::from("12")))]
    fn scans_numeric_literals(#[case] source: &str, #[case] expected: TokenKind) {
        let actual = kinds(source);
        assert_eq!(actual[0], expected);
    }

    #[test]
    fn trailing_dot_without_digit_is_not_consumed() {
        let kinds = kinds("12.");
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntegerLiteral(Rc::from("12")),
                TokenKind::Operator(Operator::Dot),
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn recognizes_two_char_operators_before_one_char_forms() {
        let kinds = kinds(":= => :");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Operator(Operator::Assign),
                TokenKind::Operator(Operator::Arrow),
                TokenKind::Operator(Operator::Colon),
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn keywords_and_booleans_are_tagged_distinctly_from_identifiers() {
        let kinds = kinds("class true notakeyword");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Class),
                TokenKind::BooleanLiteral(true),
                TokenKind::Identifier(Rc::from("notakeyword")),
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn unexpected_character_fails_the_scan() {
        let file = SourceFile::new("t.o", "var x := @");
        assert!(tokenize(&file).is_err());
    }

    #[test]
    fn reports_ascending_positions() {
        let file = SourceFile::new("t.o", "class\nFoo");
        let tokens = tokenize(&file).unwrap();
        assert_eq!(tokens[0].position.line, 1);
        assert_eq!(tokens[1].position.line, 2);
        assert_eq!(tokens[1].position.column, 1);
    }
}
