//! Filter lexer: turns a filter string into a flat token stream.

use serde::Serialize;

use super::parser::ComparisonOp;
use crate::error::{FilterError, FilterResult};

/// A single token of a filter expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Token {
    /// Attribute path, e.g. `recipe.user.id`.
    Identifier(String),
    Operator(ComparisonOp),
    /// Literal text. Quotes are already stripped when `quoted` is set.
    Literal { raw: String, quoted: bool },
    LParen,
    RParen,
    And,
    Or,
}

/// A token with the character offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub offset: usize,
}

/// Tokenize a filter expression.
///
/// A bare word directly after an operator is always literal text, so
/// `useAbbreviation=true` and `createdAt>2021-02-22` lex as path, operator,
/// literal. Elsewhere a bare word is an identifier when it looks like a path
/// and literal text otherwise.
pub fn tokenize(input: &str) -> FilterResult<Vec<Lexeme>> {
    let chars: Vec<char> = input.chars().collect();
    let mut lexemes: Vec<Lexeme> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let offset = i;

        match c {
            '(' => {
                lexemes.push(Lexeme {
                    token: Token::LParen,
                    offset,
                });
                i += 1;
            }
            ')' => {
                lexemes.push(Lexeme {
                    token: Token::RParen,
                    offset,
                });
                i += 1;
            }
            '"' => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != '"' {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(FilterError::syntax(offset, "unterminated string literal"));
                }
                let raw: String = chars[start..i].iter().collect();
                i += 1; // closing quote
                lexemes.push(Lexeme {
                    token: Token::Literal { raw, quoted: true },
                    offset,
                });
            }
            '=' | '!' | '<' | '>' => {
                let op = lex_operator(&chars, &mut i)?;
                lexemes.push(Lexeme {
                    token: Token::Operator(op),
                    offset,
                });
            }
            _ => {
                while i < chars.len() && !is_word_boundary(chars[i]) {
                    i += 1;
                }
                let word: String = chars[offset..i].iter().collect();
                let after_operator =
                    matches!(lexemes.last(), Some(Lexeme { token: Token::Operator(_), .. }));
                lexemes.push(Lexeme {
                    token: classify_word(word, after_operator),
                    offset,
                });
            }
        }
    }

    tracing::trace!(count = lexemes.len(), "tokenized filter expression");
    Ok(lexemes)
}

/// Match an operator greedily: `>=` before `>`, `<=` before `<`.
fn lex_operator(chars: &[char], i: &mut usize) -> FilterResult<ComparisonOp> {
    let start = *i;
    let first = chars[start];
    let followed_by_eq = chars.get(start + 1) == Some(&'=');

    let (op, width) = match (first, followed_by_eq) {
        ('>', true) => (ComparisonOp::Gte, 2),
        ('>', false) => (ComparisonOp::Gt, 1),
        ('<', true) => (ComparisonOp::Lte, 2),
        ('<', false) => (ComparisonOp::Lt, 1),
        ('!', true) => (ComparisonOp::Neq, 2),
        ('=', _) => (ComparisonOp::Eq, 1),
        _ => return Err(FilterError::syntax(start, "expected '=' after '!'")),
    };
    *i += width;
    Ok(op)
}

fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '"' | '=' | '!' | '<' | '>')
}

fn classify_word(word: String, after_operator: bool) -> Token {
    if word.eq_ignore_ascii_case("AND") {
        return Token::And;
    }
    if word.eq_ignore_ascii_case("OR") {
        return Token::Or;
    }
    if !after_operator && is_path(&word) {
        return Token::Identifier(word);
    }
    Token::Literal {
        raw: word,
        quoted: false,
    }
}

/// `[A-Za-z_][A-Za-z0-9_.]*`
fn is_path(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
