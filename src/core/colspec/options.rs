//! Option binding for column specifiers and inline cell directives
//!
//! Binds a parsed option list to required names, defaults, aliases and
//! single-token mappings. Later assignments to the same key win.

use std::collections::VecDeque;
use std::fmt::Write;

use indexmap::IndexMap;

use super::parser::{parse_option_list, NamedOption, ParsedColumnDef, ParsedOptions, Value};
use super::specifier::ColumnSpecifier;
use crate::utils::error::{TableError, TableResult};

/// A resolved option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Column(Box<ColumnSpecifier>),
    Columns(Vec<ColumnSpecifier>),
}

impl OptionValue {
    /// Convert a raw grammar value, building nested column specifiers
    pub fn from_value(value: Value) -> TableResult<Self> {
        Ok(match value {
            Value::Bool(b) => OptionValue::Bool(b),
            Value::Int(i) => OptionValue::Int(i),
            Value::Float(f) => OptionValue::Float(f),
            Value::Str(s) => OptionValue::Str(s),
            Value::None => OptionValue::None,
            Value::Column(def) => {
                OptionValue::Column(Box::new(ColumnSpecifier::from_parsed(def)?))
            }
            Value::List(defs) => OptionValue::Columns(
                defs.into_iter()
                    .map(ColumnSpecifier::from_parsed)
                    .collect::<TableResult<Vec<_>>>()?,
            ),
        })
    }

    pub fn is_none(&self) -> bool {
        matches!(self, OptionValue::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            OptionValue::Int(i) if *i >= 0 => Some(*i as usize),
            OptionValue::Str(s) => s.trim_start_matches('+').parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Int(i) => Some(*i as f64),
            OptionValue::Float(f) => Some(*f),
            OptionValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_column(&self) -> Option<&ColumnSpecifier> {
        match self {
            OptionValue::Column(c) => Some(c),
            _ => None,
        }
    }

    /// Text that parses back to an equal value
    pub fn to_dsl(&self) -> String {
        match self {
            OptionValue::None => "none".to_string(),
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Int(i) => i.to_string(),
            OptionValue::Float(f) => float_dsl(*f),
            OptionValue::Str(s) => quote(s),
            OptionValue::Column(c) => c.to_string(),
            OptionValue::Columns(cols) => {
                let mut out = String::from("[");
                for (i, col) in cols.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{}", col);
                }
                out.push(']');
                out
            }
        }
    }

    /// Value as it appears inside a LaTeX key-value list
    pub fn to_latex(&self) -> String {
        match self {
            OptionValue::Str(s) => s.clone(),
            OptionValue::Float(f) => f.to_string(),
            OptionValue::Column(c) => c.render(),
            other => other.to_dsl(),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

/// Floats always carry a decimal point so they re-lex as floats
pub(crate) fn float_dsl(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}

pub(crate) fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

// ============================================================================
// Option schema
// ============================================================================

/// Required names, defaults, aliases and token mappings for an option list
#[derive(Debug, Clone, Default)]
pub struct OptionSchema {
    name: String,
    required: Vec<String>,
    defaults: IndexMap<String, OptionValue>,
    aliases: IndexMap<String, String>,
    tokens: IndexMap<String, (String, OptionValue)>,
}

impl OptionSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.required.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn default_value(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.defaults.insert(name.to_string(), value.into());
        self
    }

    pub fn default_none(mut self, name: &str) -> Self {
        self.defaults.insert(name.to_string(), OptionValue::None);
        self
    }

    pub fn alias(mut self, short: &str, canonical: &str) -> Self {
        self.aliases.insert(short.to_string(), canonical.to_string());
        self
    }

    pub fn token(mut self, token: &str, key: &str, value: impl Into<OptionValue>) -> Self {
        self.tokens
            .insert(token.to_string(), (key.to_string(), value.into()));
        self
    }

    /// Parse and bind an option string
    pub fn parse(&self, text: &str) -> TableResult<IndexMap<String, OptionValue>> {
        self.validate_aliases()?;
        self.resolve(parse_option_list(text)?)
    }

    /// Bind an already parsed option list
    pub fn resolve(&self, parsed: ParsedOptions) -> TableResult<IndexMap<String, OptionValue>> {
        let mut positional: VecDeque<OptionValue> = parsed
            .positional
            .into_iter()
            .map(OptionValue::from_value)
            .collect::<TableResult<_>>()?;

        let mut named: IndexMap<String, OptionValue> = IndexMap::new();
        for option in parsed.named {
            let (key, value) = match option {
                NamedOption::KeyValue { key, value } => {
                    (self.canonical(&key), OptionValue::from_value(value)?)
                }
                NamedOption::Token(token) => self.process_token(&token),
            };
            named.insert(key, value);
        }

        let mut got = self.defaults.clone();
        for arg in &self.required {
            if let Some(value) = named.shift_remove(arg) {
                got.insert(arg.clone(), value);
            } else if let Some(value) = positional.pop_front() {
                got.insert(arg.clone(), value);
            } else if !self.defaults.contains_key(arg) {
                return Err(TableError::missing_option(&self.name, arg));
            }
        }

        if !positional.is_empty() {
            return Err(TableError::definition(format!(
                "{} takes {} positional argument(s) but {} were given",
                self.name,
                self.required.len(),
                self.required.len() + positional.len()
            )));
        }

        got.extend(named);
        Ok(got)
    }

    fn validate_aliases(&self) -> TableResult<()> {
        match self.aliases.keys().find(|alias| alias.chars().count() < 2) {
            Some(alias) => Err(TableError::definition(format!(
                "alias {:?} is too short: aliases must consist of at least two characters",
                alias
            ))),
            None => Ok(()),
        }
    }

    fn canonical(&self, key: &str) -> String {
        self.aliases
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn process_token(&self, token: &str) -> (String, OptionValue) {
        let token = self.canonical(token);
        match self.tokens.get(&token) {
            Some((key, value)) => (self.canonical(key), value.clone()),
            None => (token, OptionValue::Bool(true)),
        }
    }
}

/// Parse an option string against required names, defaults, aliases and
/// single-token mappings
pub fn parse_options(
    text: &str,
    required: &[&str],
    defaults: &[(&str, OptionValue)],
    aliases: &[(&str, &str)],
    tokens: &[(&str, (&str, OptionValue))],
) -> TableResult<IndexMap<String, OptionValue>> {
    let mut schema = OptionSchema::new("options").required(required);
    for (name, value) in defaults {
        schema = schema.default_value(name, value.clone());
    }
    for (short, canonical) in aliases {
        schema = schema.alias(short, canonical);
    }
    for (token, (key, value)) in tokens {
        schema = schema.token(token, key, value.clone());
    }
    schema.parse(text)
}

// ============================================================================
// Constructor arguments for column specifiers
// ============================================================================

/// Arguments of one column definition, consumed as the specifier binds them
#[derive(Debug)]
pub(crate) struct OptionBag {
    identifier: char,
    offset: Option<usize>,
    positional: VecDeque<OptionValue>,
    named: IndexMap<String, OptionValue>,
}

impl OptionBag {
    pub fn new(
        identifier: char,
        positional: Vec<OptionValue>,
        named: IndexMap<String, OptionValue>,
    ) -> Self {
        Self {
            identifier,
            offset: None,
            positional: positional.into(),
            named,
        }
    }

    pub fn from_parsed(def: ParsedColumnDef) -> TableResult<Self> {
        let positional = def
            .positional
            .into_iter()
            .map(OptionValue::from_value)
            .collect::<TableResult<Vec<_>>>()?;

        let mut named = IndexMap::new();
        for option in def.named {
            let (key, value) = match option {
                NamedOption::KeyValue { key, value } => (key, OptionValue::from_value(value)?),
                NamedOption::Token(token) => (token, OptionValue::Bool(true)),
            };
            named.insert(key, value);
        }

        let mut bag = Self::new(def.identifier, positional, named);
        bag.offset = Some(def.offset);
        Ok(bag)
    }

    pub fn identifier(&self) -> char {
        self.identifier
    }

    /// Keyword first, otherwise the next positional argument
    pub fn required(&mut self, name: &str) -> TableResult<OptionValue> {
        if let Some(value) = self.named.shift_remove(name) {
            return Ok(value);
        }
        self.positional
            .pop_front()
            .ok_or_else(|| TableError::missing_option(self.identifier.to_string(), name))
    }

    pub fn optional(&mut self, name: &str) -> Option<OptionValue> {
        self.named.shift_remove(name)
    }

    pub fn error(&self, message: impl Into<String>) -> TableError {
        let message = format!("column '{}': {}", self.identifier, message.into());
        match self.offset {
            Some(offset) => TableError::definition_at(message, offset),
            None => TableError::definition(message),
        }
    }

    /// Fail on any argument the column kind did not consume
    pub fn finish(self) -> TableResult<()> {
        if let Some(value) = self.positional.front() {
            return Err(self.error(format!("unexpected positional argument {}", value.to_dsl())));
        }
        if let Some(key) = self.named.keys().next() {
            return Err(self.error(format!("unexpected option '{}'", key)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_last_assignment_wins() {
        let got = parse_options(
            "1,p[0.2],ul,mr",
            &["columns", "column_specifier"],
            &[],
            &[("ul", "underline")],
            &[("mr", ("underline", OptionValue::from("midrule")))],
        )
        .unwrap();

        let keys: Vec<&str> = got.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["columns", "column_specifier", "underline"]);
        assert_eq!(got["columns"], OptionValue::Int(1));
        assert_eq!(
            got["column_specifier"].as_column().map(|c| c.identifier()),
            Some('p')
        );
        assert_eq!(got["underline"], OptionValue::from("midrule"));
    }

    #[test]
    fn test_earlier_value_is_overwritten_in_place() {
        let got = parse_options(
            "mr,ul",
            &[],
            &[],
            &[("ul", "underline")],
            &[("mr", ("underline", OptionValue::from("midrule")))],
        )
        .unwrap();
        assert_eq!(got["underline"], OptionValue::Bool(true));
    }

    #[test]
    fn test_defaults_fill_missing_required() {
        let schema = OptionSchema::new("multicolumn")
            .required(&["columns", "column_specifier"])
            .default_value("columns", 1i64)
            .default_none("column_specifier")
            .default_value("force_multicolumn", false)
            .alias("fm", "force_multicolumn");

        let got = schema.parse("").unwrap();
        assert_eq!(got["columns"], OptionValue::Int(1));
        assert!(got["column_specifier"].is_none());

        let got = schema.parse("3,fm=true").unwrap();
        assert_eq!(got["columns"], OptionValue::Int(3));
        assert_eq!(got["force_multicolumn"], OptionValue::Bool(true));
    }

    #[test]
    fn test_alias_chain_to_token() {
        let schema = OptionSchema::new("multicolumn")
            .alias("mr", "midrule")
            .token("midrule", "underline", "midrule");
        let got = schema.parse("mr").unwrap();
        assert_eq!(got["underline"], OptionValue::from("midrule"));
    }

    #[test]
    fn test_missing_required_option() {
        let err = parse_options("", &["columns"], &[], &[], &[]).unwrap_err();
        assert!(matches!(err, TableError::MissingRequiredOption { ref option, .. } if option == "columns"));
    }

    #[test]
    fn test_too_many_positional_arguments() {
        let err = parse_options("1,2", &["columns"], &[], &[], &[]).unwrap_err();
        assert!(err.to_string().contains("positional"));
    }

    #[test]
    fn test_short_alias_is_rejected() {
        let err = parse_options("u", &[], &[], &[("u", "underline")], &[]).unwrap_err();
        assert!(err.to_string().contains("at least two characters"));
    }

    #[test]
    fn test_float_dsl_keeps_decimal_point() {
        assert_eq!(float_dsl(3.0), "3.0");
        assert_eq!(float_dsl(0.25), "0.25");
        assert_eq!(quote("it's"), r"'it\'s'");
    }
}
