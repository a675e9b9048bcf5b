//! Tokenizer for the column-specification DSL
//!
//! Produces a flat token stream with byte offsets; the grammar lives in
//! [`super::parser`].

use crate::utils::error::{TableError, TableResult};

/// Kinds of tokens in a column definition string
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier, key or bare token: `[A-Za-z_][A-Za-z0-9_-]*`
    Word(String),
    /// Integer or decimal number, kept as written
    Number(String),
    /// Number immediately followed by a unit, e.g. `3cm`
    Length(String),
    /// Quoted string with escapes resolved
    Str(String),
    LBracket,
    RBracket,
    Comma,
    Equals,
}

/// A token and the byte offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Split a column definition string into tokens
pub fn tokenize(input: &str) -> TableResult<Vec<Token>> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let (offset, ch) = chars[pos];

        if ch.is_whitespace() {
            pos += 1;
            continue;
        }

        let kind = match ch {
            '[' => {
                pos += 1;
                TokenKind::LBracket
            }
            ']' => {
                pos += 1;
                TokenKind::RBracket
            }
            ',' => {
                pos += 1;
                TokenKind::Comma
            }
            '=' => {
                pos += 1;
                TokenKind::Equals
            }
            '\'' | '"' => {
                let (text, next) = read_quoted(&chars, pos, input.len())?;
                pos = next;
                TokenKind::Str(text)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len()
                    && (chars[pos].1.is_ascii_alphanumeric()
                        || chars[pos].1 == '_'
                        || chars[pos].1 == '-')
                {
                    pos += 1;
                }
                TokenKind::Word(collect(&chars, start, pos))
            }
            c if starts_number(&chars, pos, c) => {
                let start = pos;
                if c == '-' || c == '+' {
                    pos += 1;
                }
                while pos < chars.len() && chars[pos].1.is_ascii_digit() {
                    pos += 1;
                }
                if pos < chars.len() && chars[pos].1 == '.' {
                    pos += 1;
                    while pos < chars.len() && chars[pos].1.is_ascii_digit() {
                        pos += 1;
                    }
                }
                let number_end = pos;
                while pos < chars.len() && chars[pos].1.is_ascii_alphabetic() {
                    pos += 1;
                }
                if pos > number_end {
                    TokenKind::Length(collect(&chars, start, pos))
                } else {
                    TokenKind::Number(collect(&chars, start, pos))
                }
            }
            other => {
                return Err(TableError::definition_at(
                    format!("unexpected character {:?}", other),
                    offset,
                ))
            }
        };

        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

fn starts_number(chars: &[(usize, char)], pos: usize, c: char) -> bool {
    let next_is_digit = |i: usize| chars.get(i).is_some_and(|(_, n)| n.is_ascii_digit());

    match c {
        '0'..='9' => true,
        '-' | '+' => {
            next_is_digit(pos + 1)
                || (chars.get(pos + 1).is_some_and(|(_, n)| *n == '.') && next_is_digit(pos + 2))
        }
        '.' => next_is_digit(pos + 1),
        _ => false,
    }
}

fn read_quoted(
    chars: &[(usize, char)],
    start: usize,
    input_len: usize,
) -> TableResult<(String, usize)> {
    let quote = chars[start].1;
    let mut text = String::new();
    let mut pos = start + 1;

    while pos < chars.len() {
        match chars[pos].1 {
            '\\' if pos + 1 < chars.len() => {
                text.push(chars[pos + 1].1);
                pos += 2;
            }
            c if c == quote => return Ok((text, pos + 1)),
            c => {
                text.push(c);
                pos += 1;
            }
        }
    }

    Err(TableError::definition_at(
        format!("unterminated string starting with {}", quote),
        chars.get(start).map(|(o, _)| *o).unwrap_or(input_len),
    ))
}

fn collect(chars: &[(usize, char)], start: usize, end: usize) -> String {
    chars[start..end].iter().map(|(_, c)| c).collect()
}
