//! Cell directives
//!
//! Cells carry layout instructions inside their content: leading `~~~`
//! indentation markers, a `` `...`{=multicolumn} `` option string and short
//! sentinels such as `_`, `2_`, `>` or `2>`. [`CellDirective::extract`] removes
//! all of them in one pass and returns what they asked for.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use super::content::{normalize_spaces, Inline};
use crate::core::colspec::{ColumnSpecifier, OptionSchema, OptionValue};
use crate::utils::error::{RenderWarning, TableError, TableResult};

const MULTICOLUMN_KEYS: &[&str] = &["columns", "column_specifier", "underline", "force_multicolumn"];

/// Indentation marker
pub const INDENT_MARKER: &str = "~~~";

/// Raw format carrying a multicolumn option string
pub const MULTICOLUMN_FORMAT: &str = "multicolumn";

lazy_static! {
    static ref CELL_OPTION_STRING: Regex =
        Regex::new(r"^(?:(?P<underline>[1-9][0-9]?)?(?P<u>_))?(?:(?P<multicolumn>[1-9][0-9]?)?(?P<m>>))?$")
            .unwrap();

    static ref MULTICOLUMN_OPTIONS: OptionSchema = OptionSchema::new("multicolumn")
        .required(&["columns", "column_specifier"])
        .default_value("columns", 1i64)
        .default_none("column_specifier")
        .default_none("underline")
        .default_value("force_multicolumn", false)
        .alias("ul", "underline")
        .alias("fm", "force_multicolumn")
        .alias("mr", "midrule")
        .token("midrule", "underline", "midrule");
}

/// Rule requested below a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Underline {
    /// Partial rule over this many logical columns (at least the cell's span)
    Columns(usize),
    /// Full-width `\midrule`
    Midrule,
}

/// Layout instructions extracted from a cell's content
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellDirective {
    pub indent_level: usize,
    /// Logical columns the cell spans, if requested in the content
    pub columns: Option<usize>,
    pub underline: Option<Underline>,
    /// Column specifier overriding the multicolumn definition
    pub column_specifier: Option<ColumnSpecifier>,
    /// Emit `\multicolumn` even for a single column
    pub force_multicolumn: bool,
}

impl CellDirective {
    /// Strip all directives from `content`
    ///
    /// A malformed multicolumn option string is an error unless
    /// `ignore_errors` is set, in which case it is dropped with a warning.
    pub fn extract(
        content: &[Inline],
        ignore_errors: bool,
        warnings: &mut Vec<RenderWarning>,
    ) -> TableResult<(CellDirective, Vec<Inline>)> {
        let mut directive = CellDirective::default();
        let mut kept = Vec::with_capacity(content.len());
        let mut leading = true;

        for inline in content {
            match inline {
                Inline::Str(s) if leading && s == INDENT_MARKER => {
                    directive.indent_level += 1;
                }
                Inline::Space if leading => {}
                Inline::Raw { format, text } if format == MULTICOLUMN_FORMAT => {
                    match directive.apply_options(text) {
                        Ok(()) => {}
                        Err(err) if ignore_errors && err.is_recoverable() => {
                            warn!("ignoring cell options {:?}: {}", text, err);
                            warnings.push(RenderWarning::new(format!(
                                "ignored cell options {:?}: {}",
                                text, err
                            )));
                        }
                        Err(err) => return Err(err),
                    }
                }
                other => {
                    leading = false;
                    let is_sentinel = matches!(other, Inline::Str(s) if !s.is_empty() && CELL_OPTION_STRING.is_match(s));
                    if let (true, Inline::Str(s)) = (is_sentinel, other) {
                        directive.apply_sentinel(s);
                    } else {
                        kept.push(other.clone());
                    }
                }
            }
        }

        Ok((directive, normalize_spaces(kept)))
    }

    /// Total span for a cell that declares `declared` columns itself
    pub fn span(&self, declared: usize) -> usize {
        declared.max(self.columns.unwrap_or(1)).max(1)
    }

    /// `_`, `n_`, `>`, `n>` and combinations such as `2_3>`
    fn apply_sentinel(&mut self, word: &str) {
        let Some(caps) = CELL_OPTION_STRING.captures(word) else {
            return;
        };

        if caps.name("u").is_some() {
            let width = caps
                .name("underline")
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            self.underline = Some(Underline::Columns(width));
        }
        if caps.name("m").is_some() {
            let extra: usize = caps
                .name("multicolumn")
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            self.columns = Some(extra + 1);
        }
        debug!("cell sentinel {:?} -> {:?}", word, self);
    }

    fn apply_options(&mut self, text: &str) -> TableResult<()> {
        let options = MULTICOLUMN_OPTIONS.parse(text)?;
        if let Some(key) = options.keys().find(|key| !MULTICOLUMN_KEYS.contains(&key.as_str())) {
            return Err(TableError::definition(format!(
                "unknown multicolumn option '{}'",
                key
            )));
        }

        if let Some(value) = options.get("columns") {
            let columns = value
                .as_usize()
                .filter(|c| *c >= 1)
                .ok_or_else(|| {
                    TableError::definition(format!(
                        "multicolumn columns must be a positive integer, got {}",
                        value.to_dsl()
                    ))
                })?;
            self.columns = Some(columns);
        }

        match options.get("column_specifier") {
            None | Some(OptionValue::None) => {}
            Some(OptionValue::Column(column)) => self.column_specifier = Some((**column).clone()),
            Some(other) => {
                return Err(TableError::definition(format!(
                    "column_specifier must be a column definition, got {}",
                    other.to_dsl()
                )))
            }
        }

        self.underline = match options.get("underline") {
            None | Some(OptionValue::None) | Some(OptionValue::Bool(false)) => None,
            Some(OptionValue::Bool(true)) => Some(Underline::Columns(1)),
            Some(OptionValue::Str(s)) if s == "midrule" => Some(Underline::Midrule),
            Some(other) => match other.as_usize() {
                Some(n) if n >= 1 => Some(Underline::Columns(n)),
                _ => {
                    return Err(TableError::definition(format!(
                        "underline must be true, a column count or 'midrule', got {}",
                        other.to_dsl()
                    )))
                }
            },
        };

        self.force_multicolumn = options
            .get("force_multicolumn")
            .and_then(OptionValue::as_bool)
            .unwrap_or(false);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn extract(text: &str) -> (CellDirective, Vec<Inline>) {
        let mut warnings = Vec::new();
        CellDirective::extract(&Inline::parse_text(text), false, &mut warnings).unwrap()
    }

    #[rstest]
    #[case("_", None, Some(Underline::Columns(1)))]
    #[case("3_", None, Some(Underline::Columns(3)))]
    #[case(">", Some(2), None)]
    #[case("2>", Some(3), None)]
    #[case("_>", Some(2), Some(Underline::Columns(1)))]
    #[case("2_3>", Some(4), Some(Underline::Columns(2)))]
    fn test_short_form_sentinels(
        #[case] sentinel: &str,
        #[case] columns: Option<usize>,
        #[case] underline: Option<Underline>,
    ) {
        let (directive, content) = extract(&format!("Total {}", sentinel));
        assert_eq!(directive.columns, columns);
        assert_eq!(directive.underline, underline);
        assert_eq!(content, vec![Inline::str("Total")]);
    }

    #[rstest]
    #[case("0_")]
    #[case("__")]
    #[case("a>")]
    #[case("100>")]
    fn test_words_that_are_not_sentinels(#[case] word: &str) {
        let (directive, content) = extract(word);
        assert_eq!(directive, CellDirective::default());
        assert_eq!(content, vec![Inline::str(word)]);
    }

    #[test]
    fn test_indentation_markers() {
        let (directive, content) = extract("~~~ ~~~ Subtotal");
        assert_eq!(directive.indent_level, 2);
        assert_eq!(content, vec![Inline::str("Subtotal")]);
    }

    #[test]
    fn test_only_leading_markers_indent() {
        let (directive, content) = extract("a ~~~");
        assert_eq!(directive.indent_level, 0);
        assert_eq!(
            content,
            vec![Inline::str("a"), Inline::Space, Inline::str("~~~")]
        );
    }

    #[test]
    fn test_multicolumn_options() {
        let (directive, content) = extract("`2,c,mr`{=multicolumn} Both");
        assert_eq!(directive.columns, Some(2));
        assert_eq!(
            directive.column_specifier.as_ref().map(|c| c.identifier()),
            Some('c')
        );
        assert_eq!(directive.underline, Some(Underline::Midrule));
        assert!(!directive.force_multicolumn);
        assert_eq!(content, vec![Inline::str("Both")]);
    }

    #[test]
    fn test_force_multicolumn_and_underline_width() {
        let (directive, _) = extract("`fm,ul=3`{=multicolumn} x");
        assert_eq!(directive.columns, Some(1));
        assert!(directive.force_multicolumn);
        assert_eq!(directive.underline, Some(Underline::Columns(3)));
    }

    #[test]
    fn test_invalid_options() {
        let content = Inline::parse_text("`0`{=multicolumn} x");
        let mut warnings = Vec::new();
        assert!(CellDirective::extract(&content, false, &mut warnings).is_err());

        let (directive, kept) = CellDirective::extract(&content, true, &mut warnings).unwrap();
        assert_eq!(directive.columns, None);
        assert_eq!(kept, vec![Inline::str("x")]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let content = Inline::parse_text("`undreline=2`{=multicolumn} a");
        let mut warnings = Vec::new();
        let err = CellDirective::extract(&content, false, &mut warnings).unwrap_err();
        assert!(err.to_string().contains("unknown multicolumn option 'undreline'"));

        let (directive, kept) = CellDirective::extract(&content, true, &mut warnings).unwrap();
        assert_eq!(directive.underline, None);
        assert_eq!(directive.columns, None);
        assert_eq!(kept, vec![Inline::str("a")]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("undreline"));
    }

    #[test]
    fn test_span() {
        let directive = CellDirective {
            columns: Some(3),
            ..Default::default()
        };
        assert_eq!(directive.span(1), 3);
        assert_eq!(directive.span(4), 4);
        assert_eq!(CellDirective::default().span(0), 1);
    }
}
