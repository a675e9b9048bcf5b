//! Column-specification DSL
//!
//! Parses strings such as `p[0.2,indent_fraction=0.15],l,S[table-format=2.1]`
//! into typed [`ColumnSpecifier`] values.
//!
//! # Architecture
//!
//! ```text
//! text -> lexer -> parser (ParsedColumnDef) -> options (binding) -> specifier
//! ```

pub mod lexer;
mod options;
mod parser;
mod specifier;


use log::{debug, warn};

use crate::data::ALIGNMENT_IDENTIFIERS;
use crate::utils::error::{RenderWarning, TableError, TableResult};

// Re-export public API
pub use options::{parse_options, OptionSchema, OptionValue};
pub use parser::{
    parse_column_definitions, parse_option_list, NamedOption, ParsedColumnDef, ParsedOptions,
    Value,
};
pub use specifier::{
    AutoWidthColumn, ColumnKind, ColumnSpecifier, MulticolumnDefinitions, NumericColumn,
    ParagraphColumn, SimpleAlign, TextOptions, Width,
};

/// Parse a DSL string into column specifiers, failing on the first error
pub fn parse_column_specifiers(text: &str) -> TableResult<Vec<ColumnSpecifier>> {
    parse_column_definitions(&translate_alignment_names(text))?
        .into_iter()
        .map(ColumnSpecifier::from_parsed)
        .collect()
}

/// Specifiers for a table with `column_count` columns
///
/// An empty alignment yields plain `l` columns. With `ignore_errors`, a
/// definition error replaces the affected column (or, for a syntax error, the
/// whole alignment) with plain `l` columns and records a warning; a column
/// count mismatch is padded with `l` or truncated.
pub fn resolve_columns(
    alignment: &str,
    column_count: usize,
    ignore_errors: bool,
) -> TableResult<(Vec<ColumnSpecifier>, Vec<RenderWarning>)> {
    let mut warnings = Vec::new();

    if alignment.trim().is_empty() {
        return Ok((vec![ColumnSpecifier::plain_left(); column_count], warnings));
    }

    let text = translate_alignment_names(alignment);
    let defs = match parse_column_definitions(&text) {
        Ok(defs) => defs,
        Err(err) if ignore_errors && err.is_recoverable() => {
            warn!("ignoring column definition {:?}: {}", alignment, err);
            warnings.push(RenderWarning::with_suggestion(
                format!("could not parse column definition {:?}: {}", alignment, err),
                "all columns rendered as 'l'",
            ));
            Vec::new()
        }
        Err(err) => return Err(err),
    };

    let mut columns = Vec::with_capacity(column_count);
    for def in defs {
        let identifier = def.identifier;
        match ColumnSpecifier::from_parsed(def) {
            Ok(column) => columns.push(column),
            Err(err) if ignore_errors && err.is_recoverable() => {
                warn!("replacing column '{}' with 'l': {}", identifier, err);
                warnings.push(RenderWarning::with_suggestion(
                    err.to_string(),
                    format!("column '{}' rendered as 'l'", identifier),
                ));
                columns.push(ColumnSpecifier::plain_left());
            }
            Err(err) => return Err(err),
        }
    }

    if !columns.is_empty() && columns.len() != column_count {
        let message = format!(
            "alignment defines {} columns but the table has {}",
            columns.len(),
            column_count
        );
        if !ignore_errors {
            return Err(TableError::definition(message));
        }
        warn!("{}", message);
        warnings.push(RenderWarning::new(message));
    }
    if columns.len() < column_count {
        debug!("padding alignment with {} 'l' columns", column_count - columns.len());
    }
    columns.resize(column_count, ColumnSpecifier::plain_left());

    Ok((columns, warnings))
}

/// Map comma-separated alignment names (`AlignLeft`, `center`, ...) onto identifiers
fn translate_alignment_names(text: &str) -> String {
    let items: Vec<&str> = text.split(',').map(str::trim).collect();
    if items
        .iter()
        .all(|item| ALIGNMENT_IDENTIFIERS.contains_key(*item))
    {
        items
            .iter()
            .filter_map(|item| ALIGNMENT_IDENTIFIERS.get(*item).copied())
            .collect::<Vec<_>>()
            .join(",")
    } else {
        text.to_string()
    }
}
