//! Column specifier model
//!
//! A closed set of column kinds, each carrying its own option fields, wrapped
//! in [`ColumnSpecifier`] together with the options every kind shares.
//! Specifiers are values: padding suppression, indentation and multicolumn
//! substitution all return new specifiers.

use std::fmt;

use indexmap::IndexMap;

use super::options::{float_dsl, quote, OptionBag, OptionValue};
use super::parser::ParsedColumnDef;
use crate::utils::error::{TableError, TableResult};
use crate::utils::units::{format_decimal, string_to_float_unit};

// ============================================================================
// Widths
// ============================================================================

/// Width of a paragraph column
#[derive(Debug, Clone, PartialEq)]
pub enum Width {
    /// Fraction of the text width
    Fraction(f64),
    /// Absolute length, e.g. `3cm`
    Length { value: f64, unit: String },
}

impl Width {
    pub fn from_option(value: &OptionValue) -> TableResult<Self> {
        let width = match value {
            OptionValue::Float(v) => Width::Fraction(*v),
            OptionValue::Int(v) => Width::Fraction(*v as f64),
            OptionValue::Str(s) => Self::parse(s)?,
            other => {
                return Err(TableError::invalid_width(
                    other.to_dsl(),
                    "expected a number or a length",
                ))
            }
        };

        if width.value() < 0.0 {
            return Err(TableError::invalid_width(
                width.to_dsl(),
                "width must not be negative",
            ));
        }
        Ok(width)
    }

    /// `"0.3"` is a fraction, `"3cm"` a length
    pub fn parse(text: &str) -> TableResult<Self> {
        let (value, unit) = string_to_float_unit(text)?;
        Ok(if unit.is_empty() {
            Width::Fraction(value)
        } else {
            Width::Length { value, unit }
        })
    }

    pub fn value(&self) -> f64 {
        match self {
            Width::Fraction(v) => *v,
            Width::Length { value, .. } => *value,
        }
    }

    pub fn fraction(&self) -> Option<f64> {
        match self {
            Width::Fraction(v) => Some(*v),
            Width::Length { .. } => None,
        }
    }

    /// Same unit, different magnitude
    pub fn with_value(&self, value: f64) -> Self {
        match self {
            Width::Fraction(_) => Width::Fraction(value),
            Width::Length { unit, .. } => Width::Length {
                value,
                unit: unit.clone(),
            },
        }
    }

    pub fn to_latex(&self) -> String {
        match self {
            Width::Fraction(v) => format!("{:.2}\\textwidth", v),
            Width::Length { value, unit } => format!("{}{}", format_decimal(*value), unit),
        }
    }

    pub fn to_dsl(&self) -> String {
        match self {
            Width::Fraction(v) => float_dsl(*v),
            Width::Length { value, unit } => format!("{}{}", value, unit),
        }
    }
}

// ============================================================================
// Column kinds
// ============================================================================

/// Line spacing and ragged-right directives shared by `p`/`m`/`b` and `X`
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub baselineskip: Option<String>,
    pub raggedright: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            baselineskip: Some("10pt".to_string()),
            raggedright: false,
        }
    }
}

impl TextOptions {
    fn from_bag(bag: &mut OptionBag) -> TableResult<Self> {
        let mut options = Self::default();

        if let Some(value) = bag.optional("baselineskip") {
            options.baselineskip = match value {
                OptionValue::None | OptionValue::Bool(false) => None,
                OptionValue::Str(s) if s.parse::<f64>().is_ok() => Some(format!("{}pt", s)),
                OptionValue::Str(s) => Some(s),
                OptionValue::Int(i) => Some(format!("{}pt", i)),
                OptionValue::Float(f) => Some(format!("{}pt", f)),
                other => {
                    return Err(bag.error(format!(
                        "baselineskip must be a length, got {}",
                        other.to_dsl()
                    )))
                }
            };
        }
        if let Some(value) = bag.optional("raggedright") {
            options.raggedright = value
                .as_bool()
                .ok_or_else(|| bag.error("raggedright must be true or false"))?;
        }

        Ok(options)
    }

    /// `>{...}` prefix inserted before the column type
    pub fn option_string(&self) -> String {
        let mut parts = String::new();
        if let Some(ref skip) = self.baselineskip {
            parts.push_str(&format!("\\baselineskip={}", skip));
        }
        if self.raggedright {
            parts.push_str("\\RaggedRight\\arraybackslash");
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!(">{{{}}}", parts)
        }
    }

    fn dsl_args(&self, args: &mut Vec<String>) {
        let defaults = Self::default();
        if self.baselineskip != defaults.baselineskip {
            match self.baselineskip {
                Some(ref skip) => args.push(format!("baselineskip={}", quote(skip))),
                None => args.push("baselineskip=false".to_string()),
            }
        }
        if self.raggedright {
            args.push("raggedright=true".to_string());
        }
    }
}

/// `l`, `r` and `c`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleAlign {
    Left,
    Right,
    Center,
}

impl SimpleAlign {
    pub fn identifier(&self) -> char {
        match self {
            SimpleAlign::Left => 'l',
            SimpleAlign::Right => 'r',
            SimpleAlign::Center => 'c',
        }
    }
}

const DEFAULT_INDENT_FRACTION: f64 = 0.1;

/// `p`, `m` and `b`: fixed-width paragraph columns
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphColumn {
    pub identifier: char,
    pub width: Width,
    pub indent_fraction: f64,
    pub text: TextOptions,
    /// Width consumed by each indentation level, the content column last
    indent_widths: Vec<f64>,
    /// Identifier used when rendering a synthesized multicolumn definition
    render_as: Option<char>,
}

impl ParagraphColumn {
    fn from_bag(identifier: char, bag: &mut OptionBag) -> TableResult<Self> {
        let width = Width::from_option(&bag.required("width")?)?;

        let indent_fraction = match bag.optional("indent_fraction") {
            Some(value) => value
                .as_f64()
                .ok_or_else(|| bag.error("indent_fraction must be a number"))?,
            None => DEFAULT_INDENT_FRACTION,
        };
        if !(0.0..1.0).contains(&indent_fraction) {
            return Err(bag.error(format!(
                "indent_fraction must lie in [0, 1), got {}",
                indent_fraction
            )));
        }

        Ok(Self {
            identifier,
            width,
            indent_fraction,
            text: TextOptions::from_bag(bag)?,
            indent_widths: Vec::new(),
            render_as: None,
        })
    }

    pub fn indent_widths(&self) -> &[f64] {
        &self.indent_widths
    }

    fn body(&self) -> String {
        format!(
            "{}{}{{{}}}",
            self.text.option_string(),
            self.render_as.unwrap_or(self.identifier),
            self.width.to_latex()
        )
    }

    fn dsl_args(&self, args: &mut Vec<String>) {
        args.push(self.width.to_dsl());
        if self.indent_fraction != DEFAULT_INDENT_FRACTION {
            args.push(format!("indent_fraction={}", float_dsl(self.indent_fraction)));
        }
        self.text.dsl_args(args);
    }
}

/// `S`: decimal-aligned numbers (siunitx)
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub table_format: Option<OptionValue>,
    pub add_integer_zero: Option<OptionValue>,
    pub table_column_width: Option<Width>,
    pub table_number_alignment: Option<OptionValue>,
    pub retain_explicit_plus: Option<OptionValue>,
    pub detect_inline_weight: Option<OptionValue>,
}

impl Default for NumericColumn {
    fn default() -> Self {
        Self {
            table_format: Some(OptionValue::from("3.2")),
            add_integer_zero: None,
            table_column_width: None,
            table_number_alignment: None,
            retain_explicit_plus: None,
            detect_inline_weight: Some(OptionValue::from("math")),
        }
    }
}

impl NumericColumn {
    fn from_bag(bag: &mut OptionBag) -> TableResult<Self> {
        let mut column = Self::default();

        take(bag, "table_format", &mut column.table_format);
        take(bag, "add_integer_zero", &mut column.add_integer_zero);
        take(bag, "table_number_alignment", &mut column.table_number_alignment);
        take(bag, "retain_explicit_plus", &mut column.retain_explicit_plus);
        take(bag, "detect_inline_weight", &mut column.detect_inline_weight);

        if let Some(value) = bag.optional("table_column_width") {
            if !value.is_none() {
                column.table_column_width = Some(Width::from_option(&value)?);
            }
        }

        Ok(column)
    }

    fn entries(&self) -> Vec<(&'static str, Option<OptionValue>)> {
        vec![
            ("table_format", self.table_format.clone()),
            ("add_integer_zero", self.add_integer_zero.clone()),
            (
                "table_column_width",
                self.table_column_width
                    .as_ref()
                    .map(|w| OptionValue::Str(w.to_latex())),
            ),
            ("table_number_alignment", self.table_number_alignment.clone()),
            ("retain_explicit_plus", self.retain_explicit_plus.clone()),
            ("detect_inline_weight", self.detect_inline_weight.clone()),
        ]
    }

    fn body(&self) -> String {
        let options: Vec<String> = self
            .entries()
            .into_iter()
            .filter_map(|(key, value)| {
                value.map(|v| format!("{}={}", key.replace('_', "-"), v.to_latex()))
            })
            .collect();
        format!("S[{}]", options.join(","))
    }

    fn dsl_args(&self, args: &mut Vec<String>) {
        let defaults = Self::default();
        let pairs = [
            ("table_format", &self.table_format, &defaults.table_format),
            ("add_integer_zero", &self.add_integer_zero, &defaults.add_integer_zero),
            (
                "table_number_alignment",
                &self.table_number_alignment,
                &defaults.table_number_alignment,
            ),
            (
                "retain_explicit_plus",
                &self.retain_explicit_plus,
                &defaults.retain_explicit_plus,
            ),
            (
                "detect_inline_weight",
                &self.detect_inline_weight,
                &defaults.detect_inline_weight,
            ),
        ];
        for (key, value, default) in pairs {
            if value == default {
                continue;
            }
            match value {
                Some(v) => args.push(format!("{}={}", key, v.to_dsl())),
                None => args.push(format!("{}=none", key)),
            }
        }
        if let Some(ref width) = self.table_column_width {
            args.push(format!("table_column_width={}", width.to_dsl()));
        }
    }
}

fn take(bag: &mut OptionBag, key: &str, slot: &mut Option<OptionValue>) {
    if let Some(value) = bag.optional(key) {
        *slot = if value.is_none() { None } else { Some(value) };
    }
}

/// `X`: fills the remaining width of a `tabularx`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AutoWidthColumn {
    pub text: TextOptions,
}

/// The closed set of column kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    Simple(SimpleAlign),
    Paragraph(ParagraphColumn),
    Numeric(NumericColumn),
    AutoWidth(AutoWidthColumn),
}

impl ColumnKind {
    fn from_bag(bag: &mut OptionBag) -> TableResult<Self> {
        Ok(match bag.identifier() {
            'l' => ColumnKind::Simple(SimpleAlign::Left),
            'r' => ColumnKind::Simple(SimpleAlign::Right),
            'c' => ColumnKind::Simple(SimpleAlign::Center),
            id @ ('p' | 'm' | 'b') => {
                ColumnKind::Paragraph(ParagraphColumn::from_bag(id, bag)?)
            }
            'S' => ColumnKind::Numeric(NumericColumn::from_bag(bag)?),
            'X' => ColumnKind::AutoWidth(AutoWidthColumn {
                text: TextOptions::from_bag(bag)?,
            }),
            other => {
                return Err(bag.error(format!(
                    "could not find a column class with the identifier '{}'",
                    other
                )))
            }
        })
    }

    pub fn identifier(&self) -> char {
        match self {
            ColumnKind::Simple(align) => align.identifier(),
            ColumnKind::Paragraph(p) => p.identifier,
            ColumnKind::Numeric(_) => 'S',
            ColumnKind::AutoWidth(_) => 'X',
        }
    }

    /// Names of the options that must be supplied
    pub fn required_options(&self) -> &'static [&'static str] {
        match self {
            ColumnKind::Paragraph(_) => &["width"],
            _ => &[],
        }
    }

    fn body(&self) -> String {
        match self {
            ColumnKind::Simple(align) => align.identifier().to_string(),
            ColumnKind::Paragraph(p) => p.body(),
            ColumnKind::Numeric(n) => n.body(),
            ColumnKind::AutoWidth(x) => format!("{}X", x.text.option_string()),
        }
    }

    fn option_string(&self) -> String {
        match self {
            ColumnKind::Paragraph(p) => p.text.option_string(),
            ColumnKind::AutoWidth(x) => x.text.option_string(),
            _ => String::new(),
        }
    }

    fn dsl_args(&self, args: &mut Vec<String>) {
        match self {
            ColumnKind::Simple(_) => {}
            ColumnKind::Paragraph(p) => p.dsl_args(args),
            ColumnKind::Numeric(n) => n.dsl_args(args),
            ColumnKind::AutoWidth(x) => x.text.dsl_args(args),
        }
    }
}

// ============================================================================
// Column specifier
// ============================================================================

/// Override used when a column anchors a multicolumn cell
#[derive(Debug, Clone, PartialEq)]
pub enum MulticolumnDefinitions {
    /// Used for any span
    Single(Box<ColumnSpecifier>),
    /// Looked up by index
    Indexed(Vec<ColumnSpecifier>),
}

/// One table column's rendering behavior
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpecifier {
    kind: ColumnKind,
    multicolumn_definitions: Option<MulticolumnDefinitions>,
    no_space_after: bool,
    space_after: Option<String>,
    no_left_padding: bool,
    no_right_padding: bool,
}

impl ColumnSpecifier {
    /// Build a specifier from an identifier and its arguments
    pub fn new(
        identifier: char,
        positional: Vec<OptionValue>,
        named: IndexMap<String, OptionValue>,
    ) -> TableResult<Self> {
        Self::build(OptionBag::new(identifier, positional, named))
    }

    pub fn from_parsed(def: ParsedColumnDef) -> TableResult<Self> {
        Self::build(OptionBag::from_parsed(def)?)
    }

    /// The fallback column used when a definition cannot be parsed
    pub fn plain_left() -> Self {
        Self::from_kind(ColumnKind::Simple(SimpleAlign::Left))
    }

    pub fn from_kind(kind: ColumnKind) -> Self {
        let multicolumn_definitions = match kind {
            ColumnKind::Numeric(_) => Some(MulticolumnDefinitions::Single(Box::new(
                Self::plain_left(),
            ))),
            _ => None,
        };

        Self {
            kind,
            multicolumn_definitions,
            no_space_after: false,
            space_after: None,
            no_left_padding: false,
            no_right_padding: false,
        }
    }

    fn build(mut bag: OptionBag) -> TableResult<Self> {
        let mut spec = Self::from_kind(ColumnKind::from_bag(&mut bag)?);

        if let Some(value) = bag.optional("multicolumn_definitions") {
            spec.multicolumn_definitions = match value {
                OptionValue::None => None,
                OptionValue::Column(column) => Some(MulticolumnDefinitions::Single(column)),
                OptionValue::Columns(columns) => Some(MulticolumnDefinitions::Indexed(columns)),
                other => {
                    return Err(bag.error(format!(
                        "multicolumn_definitions must be a column or a list of columns, got {}",
                        other.to_dsl()
                    )))
                }
            };
        }
        if let Some(value) = bag.optional("no_space_after") {
            spec.no_space_after = value
                .as_bool()
                .ok_or_else(|| bag.error("no_space_after must be true or false"))?;
        }
        if let Some(value) = bag.optional("space_after") {
            spec.space_after = match value {
                OptionValue::None => None,
                OptionValue::Str(s) => Some(s),
                other => {
                    return Err(bag.error(format!(
                        "space_after must be a length, got {}",
                        other.to_dsl()
                    )))
                }
            };
        }

        bag.finish()?;
        Ok(spec)
    }

    pub fn identifier(&self) -> char {
        self.kind.identifier()
    }

    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    pub fn required_options(&self) -> &'static [&'static str] {
        self.kind.required_options()
    }

    pub fn multicolumn_definitions(&self) -> Option<&MulticolumnDefinitions> {
        self.multicolumn_definitions.as_ref()
    }

    /// Paragraph width, if this is a paragraph column
    pub fn width(&self) -> Option<&Width> {
        match self.kind {
            ColumnKind::Paragraph(ref p) => Some(&p.width),
            _ => None,
        }
    }

    /// Width as a fraction of the text width, where the column declares one
    pub fn fraction_width(&self) -> Option<f64> {
        match self.kind {
            ColumnKind::Paragraph(ref p) => p.width.fraction(),
            ColumnKind::Numeric(ref n) => n.table_column_width.as_ref().and_then(Width::fraction),
            _ => None,
        }
    }

    pub fn indent_widths(&self) -> &[f64] {
        match self.kind {
            ColumnKind::Paragraph(ref p) => p.indent_widths(),
            _ => &[],
        }
    }

    pub fn has_no_left_padding(&self) -> bool {
        self.no_left_padding
    }

    pub fn has_no_right_padding(&self) -> bool {
        self.no_right_padding
    }

    pub fn no_left_padding(mut self) -> Self {
        self.no_left_padding = true;
        self
    }

    pub fn no_right_padding(mut self) -> Self {
        self.no_right_padding = true;
        self
    }

    /// Formatting prefix such as `>{\baselineskip=10pt}`
    pub fn option_string(&self) -> String {
        self.kind.option_string()
    }

    /// LaTeX column type including padding directives
    pub fn render(&self) -> String {
        let before = if self.no_left_padding { "@{}" } else { "" };
        let after = match self.space_after {
            Some(ref space) => format!("@{{\\hskip {}}}", space),
            None if self.no_right_padding || self.no_space_after => "@{}".to_string(),
            None => String::new(),
        };
        format!("{}{}{}", before, self.kind.body(), after)
    }

    /// Expand into `levels + 1` specifiers, one per indentation level
    pub fn indent(&self, levels: usize) -> Vec<ColumnSpecifier> {
        if levels == 0 {
            return vec![self.clone()];
        }

        let paragraph = match self.kind {
            ColumnKind::Paragraph(ref p) => p,
            _ => return vec![self.clone(); levels + 1],
        };

        let mut remaining = paragraph.width.value();
        let mut widths = Vec::with_capacity(levels + 1);
        for _ in 0..levels {
            let step = remaining * paragraph.indent_fraction;
            remaining -= step;
            widths.push(step);
        }
        widths.push(remaining);

        widths
            .iter()
            .enumerate()
            .map(|(level, width)| {
                let mut column = self.clone();
                if let ColumnKind::Paragraph(ref mut p) = column.kind {
                    p.width = p.width.with_value(*width);
                    p.indent_widths = widths.clone();
                }
                if level < levels {
                    column.no_right_padding = true;
                }
                column
            })
            .collect()
    }

    /// The specifier used when this column anchors a multicolumn cell
    pub fn get_n_definition(&self, n: usize) -> TableResult<ColumnSpecifier> {
        match self.multicolumn_definitions {
            Some(MulticolumnDefinitions::Single(ref column)) => Ok((**column).clone()),
            Some(MulticolumnDefinitions::Indexed(ref columns)) => {
                columns
                    .get(n)
                    .cloned()
                    .ok_or(TableError::UnresolvedSpanOverride {
                        span: n,
                        available: columns.len(),
                    })
            }
            None => {
                let mut column = self.clone();
                column.no_left_padding = false;
                column.no_right_padding = false;
                if let ColumnKind::Paragraph(ref mut p) = column.kind {
                    if !p.indent_widths.is_empty() {
                        let width: f64 = p.indent_widths.iter().skip(n).sum();
                        p.width = p.width.with_value(width);
                        p.indent_widths.clear();
                        p.render_as = Some('p');
                    }
                }
                Ok(column)
            }
        }
    }

    /// Widen a synthesized paragraph definition by `extra` (same unit)
    pub fn widened(mut self, extra: f64) -> Self {
        if let ColumnKind::Paragraph(ref mut p) = self.kind {
            p.width = p.width.with_value(p.width.value() + extra);
        }
        self
    }

    fn is_default_multicolumn(&self) -> bool {
        match (&self.kind, &self.multicolumn_definitions) {
            (ColumnKind::Numeric(_), Some(MulticolumnDefinitions::Single(column))) => {
                **column == Self::plain_left()
            }
            (ColumnKind::Numeric(_), _) => false,
            (_, None) => true,
            _ => false,
        }
    }
}

/// Re-parseable DSL representation
impl fmt::Display for ColumnSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut args = Vec::new();
        self.kind.dsl_args(&mut args);

        if !self.is_default_multicolumn() {
            match self.multicolumn_definitions {
                Some(MulticolumnDefinitions::Single(ref column)) => {
                    args.push(format!("multicolumn_definitions={}", column));
                }
                Some(MulticolumnDefinitions::Indexed(ref columns)) => {
                    let value = OptionValue::Columns(columns.clone());
                    args.push(format!("multicolumn_definitions={}", value.to_dsl()));
                }
                None => args.push("multicolumn_definitions=none".to_string()),
            }
        }
        if self.no_space_after {
            args.push("no_space_after=true".to_string());
        }
        if let Some(ref space) = self.space_after {
            args.push(format!("space_after={}", quote(space)));
        }

        write!(f, "{}", self.identifier())?;
        if !args.is_empty() {
            write!(f, "[{}]", args.join(","))?;
        }
        Ok(())
    }
}
