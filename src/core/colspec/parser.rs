//! Recursive-descent grammar for the column-specification DSL
//!
//! ```text
//! column_defs := column_def (',' column_def)*
//! column_def  := IDENT_1CHAR [ '[' options ']' ]
//! options     := (positional (',' positional)* [',' named_list]) | named_list
//! named       := key '=' value | TOKEN
//! value       := column_def | BOOL | NUMBER | STRING | '[' column_defs ']'
//! ```
//!
//! The parser only builds a syntax tree; option binding happens in
//! [`super::options`] and specifier construction in [`super::specifier`].

use super::lexer::{tokenize, Token, TokenKind};
use super::options::float_dsl;
use crate::utils::error::{TableError, TableResult};

/// A column definition as written: identifier plus raw arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedColumnDef {
    pub identifier: char,
    pub positional: Vec<Value>,
    pub named: Vec<NamedOption>,
    /// Byte offset of the identifier in the source text
    pub offset: usize,
}

/// A raw argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Column(ParsedColumnDef),
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParsedColumnDef>),
    None,
}

/// A named argument: `key=value` or a bare flag token
#[derive(Debug, Clone, PartialEq)]
pub enum NamedOption {
    KeyValue { key: String, value: Value },
    Token(String),
}

/// An option list without a leading column identifier (cell directives)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedOptions {
    pub positional: Vec<Value>,
    pub named: Vec<NamedOption>,
}

/// Parse a comma-separated list of column definitions
pub fn parse_column_definitions(text: &str) -> TableResult<Vec<ParsedColumnDef>> {
    let mut parser = Parser::new(text)?;
    if parser.at_end() {
        return Ok(Vec::new());
    }
    let defs = parser.column_defs()?;
    parser.expect_end()?;
    Ok(defs)
}

/// Parse a bare option list such as `1,p[0.2],ul,mr`
pub fn parse_option_list(text: &str) -> TableResult<ParsedOptions> {
    let mut parser = Parser::new(text)?;
    if parser.at_end() {
        return Ok(ParsedOptions::default());
    }
    let options = parser.options()?;
    parser.expect_end()?;
    Ok(options)
}

/// Keys are accepted with hyphens (`table-format`) and stored with underscores
pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    len: usize,
}

impl Parser {
    fn new(text: &str) -> TableResult<Self> {
        Ok(Self {
            tokens: tokenize(text)?,
            pos: 0,
            len: text.len(),
        })
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, ahead: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.offset)
            .unwrap_or(self.len)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<TokenKind> {
        let token = self.tokens.get(self.pos).map(|t| t.kind.clone());
        self.pos += 1;
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> TableResult<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn expect_end(&self) -> TableResult<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }

    fn error(&self, message: impl Into<String>) -> TableError {
        let message = message.into();
        match self.peek() {
            Some(kind) => TableError::definition_at(
                format!("{}, found {}", message, describe(kind)),
                self.offset(),
            ),
            None => TableError::definition_at(format!("{}, found end of input", message), self.len),
        }
    }

    /// Whether the current token starts a column definition
    fn at_column_def(&self) -> bool {
        matches!(self.peek(), Some(TokenKind::Word(w)) if is_column_identifier(w))
            && self.peek_at(1) != Some(&TokenKind::Equals)
    }

    fn column_defs(&mut self) -> TableResult<Vec<ParsedColumnDef>> {
        let mut defs = vec![self.column_def()?];
        while self.eat(&TokenKind::Comma) {
            defs.push(self.column_def()?);
        }
        Ok(defs)
    }

    fn column_def(&mut self) -> TableResult<ParsedColumnDef> {
        if !self.at_column_def() {
            return Err(self.error("expected a one-letter column identifier"));
        }
        let offset = self.offset();
        let identifier = match self.advance() {
            Some(TokenKind::Word(w)) => w.chars().next(),
            _ => None,
        }
        .ok_or_else(|| TableError::definition_at("expected a column identifier", offset))?;

        let mut def = ParsedColumnDef {
            identifier,
            positional: Vec::new(),
            named: Vec::new(),
            offset,
        };

        if self.eat(&TokenKind::LBracket) && !self.eat(&TokenKind::RBracket) {
            let options = self.options()?;
            self.expect(TokenKind::RBracket, "']'")?;
            def.positional = options.positional;
            def.named = options.named;
        }

        Ok(def)
    }

    fn options(&mut self) -> TableResult<ParsedOptions> {
        let mut options = ParsedOptions::default();

        loop {
            let offset = self.offset();
            match self.option_item()? {
                Item::Positional(value) => {
                    if !options.named.is_empty() {
                        return Err(TableError::definition_at(
                            "positional argument follows a named option",
                            offset,
                        ));
                    }
                    options.positional.push(value);
                }
                Item::Named(named) => options.named.push(named),
            }

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        Ok(options)
    }

    fn option_item(&mut self) -> TableResult<Item> {
        if let Some(TokenKind::Word(word)) = self.peek() {
            let word = word.clone();
            if self.peek_at(1) == Some(&TokenKind::Equals) {
                self.pos += 2;
                let value = self.value()?;
                return Ok(Item::Named(NamedOption::KeyValue {
                    key: normalize_key(&word),
                    value,
                }));
            }
            if !is_column_identifier(&word) && bool_literal(&word).is_none() {
                self.pos += 1;
                return Ok(Item::Named(NamedOption::Token(normalize_key(&word))));
            }
        }

        Ok(Item::Positional(self.value()?))
    }

    fn value(&mut self) -> TableResult<Value> {
        if self.at_column_def() {
            return Ok(Value::Column(self.column_def()?));
        }

        let offset = self.offset();
        match self.peek().cloned() {
            Some(TokenKind::LBracket) => {
                self.pos += 1;
                let defs = self.column_defs()?;
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(Value::List(defs))
            }
            Some(TokenKind::Word(word)) => {
                self.pos += 1;
                // bare words are accepted as string values, e.g. `detect-inline-weight=math`
                Ok(match (bool_literal(&word), word.as_str()) {
                    (Some(b), _) => Value::Bool(b),
                    (None, "none" | "None") => Value::None,
                    _ => Value::Str(word),
                })
            }
            Some(TokenKind::Number(number)) => {
                self.pos += 1;
                parse_number(&number, offset)
            }
            Some(TokenKind::Length(length)) => {
                self.pos += 1;
                Ok(Value::Str(length))
            }
            Some(TokenKind::Str(text)) => {
                self.pos += 1;
                Ok(Value::Str(text))
            }
            _ => Err(self.error("expected a value")),
        }
    }
}

enum Item {
    Positional(Value),
    Named(NamedOption),
}

fn is_column_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}

fn bool_literal(word: &str) -> Option<bool> {
    match word {
        "true" | "True" => Some(true),
        "false" | "False" => Some(false),
        _ => None,
    }
}

/// Numerals whose canonical rendering differs from the source (`2.10`,
/// `+2.1`, `007`) stay strings so the text reaches LaTeX unchanged.
fn parse_number(text: &str, offset: usize) -> TableResult<Value> {
    if text.contains('.') {
        let value = text
            .parse::<f64>()
            .map_err(|_| TableError::definition_at(format!("invalid number {:?}", text), offset))?;
        if float_dsl(value) == text {
            Ok(Value::Float(value))
        } else {
            Ok(Value::Str(text.to_string()))
        }
    } else {
        let value = text
            .parse::<i64>()
            .map_err(|_| TableError::definition_at(format!("invalid integer {:?}", text), offset))?;
        if value.to_string() == text {
            Ok(Value::Int(value))
        } else {
            Ok(Value::Str(text.to_string()))
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Word(w) => format!("'{}'", w),
        TokenKind::Number(n) | TokenKind::Length(n) => format!("'{}'", n),
        TokenKind::Str(s) => format!("string {:?}", s),
        TokenKind::LBracket => "'['".to_string(),
        TokenKind::RBracket => "']'".to_string(),
        TokenKind::Comma => "','".to_string(),
        TokenKind::Equals => "'='".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifiers() {
        let defs = parse_column_definitions("l,r,c").unwrap();
        let ids: Vec<char> = defs.iter().map(|d| d.identifier).collect();
        assert_eq!(ids, vec!['l', 'r', 'c']);
        assert!(defs.iter().all(|d| d.positional.is_empty() && d.named.is_empty()));
    }

    #[test]
    fn test_positional_and_named() {
        let defs = parse_column_definitions("p[0.2,indent_fraction=0.15]").unwrap();
        assert_eq!(defs[0].positional, vec![Value::Float(0.2)]);
        assert_eq!(
            defs[0].named,
            vec![NamedOption::KeyValue {
                key: "indent_fraction".into(),
                value: Value::Float(0.15)
            }]
        );
    }

    #[test]
    fn test_flag_token_and_hyphenated_key() {
        let defs = parse_column_definitions("S[table-format=2.1,retain-explicit-plus]").unwrap();
        assert_eq!(
            defs[0].named,
            vec![
                NamedOption::KeyValue {
                    key: "table_format".into(),
                    value: Value::Float(2.1)
                },
                NamedOption::Token("retain_explicit_plus".into()),
            ]
        );
    }

    #[test]
    fn test_nested_column_values() {
        let defs =
            parse_column_definitions("p[0.3,multicolumn_definitions=[l,p[0.5]]],S[multicolumn_definitions=c]")
                .unwrap();
        match &defs[0].named[0] {
            NamedOption::KeyValue {
                value: Value::List(list),
                ..
            } => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[1].identifier, 'p');
                assert_eq!(list[1].positional, vec![Value::Float(0.5)]);
            }
            other => panic!("unexpected option {:?}", other),
        }
        match &defs[1].named[0] {
            NamedOption::KeyValue {
                value: Value::Column(def),
                ..
            } => assert_eq!(def.identifier, 'c'),
            other => panic!("unexpected option {:?}", other),
        }
    }

    #[test]
    fn test_option_list_without_identifier() {
        let options = parse_option_list("1,p[0.2],ul,mr").unwrap();
        assert_eq!(options.positional.len(), 2);
        assert_eq!(options.positional[0], Value::Int(1));
        assert!(matches!(options.positional[1], Value::Column(ref d) if d.identifier == 'p'));
        assert_eq!(
            options.named,
            vec![
                NamedOption::Token("ul".into()),
                NamedOption::Token("mr".into())
            ]
        );
    }

    #[test]
    fn test_booleans_and_strings() {
        let options = parse_option_list("true,x='a b',y=false").unwrap();
        assert_eq!(options.positional, vec![Value::Bool(true)]);
        assert_eq!(
            options.named[0],
            NamedOption::KeyValue {
                key: "x".into(),
                value: Value::Str("a b".into())
            }
        );
    }

    #[test]
    fn test_positional_after_named_is_rejected() {
        let err = parse_option_list("ul,2").unwrap_err();
        assert!(err.to_string().contains("positional argument"));
    }

    #[test]
    fn test_multi_letter_identifier_is_rejected() {
        assert!(parse_column_definitions("ll").is_err());
        assert!(parse_column_definitions("l,").is_err());
        assert!(parse_column_definitions("p[0.3").is_err());
    }

    #[test]
    fn test_numerals_keep_their_source_text() {
        let defs = parse_column_definitions("S[a=2.10,b=+2.1,c=2.5,d=7,e=007,f=-0.5]").unwrap();
        let values: Vec<Value> = defs[0]
            .named
            .iter()
            .map(|option| match option {
                NamedOption::KeyValue { value, .. } => value.clone(),
                other => panic!("unexpected option {:?}", other),
            })
            .collect();
        assert_eq!(
            values,
            vec![
                Value::Str("2.10".into()),
                Value::Str("+2.1".into()),
                Value::Float(2.5),
                Value::Int(7),
                Value::Str("007".into()),
                Value::Float(-0.5),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_column_definitions("").unwrap().is_empty());
        assert!(parse_column_definitions("  ").unwrap().is_empty());
        assert_eq!(parse_option_list("").unwrap(), ParsedOptions::default());
    }
}
