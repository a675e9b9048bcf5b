//! Table Matrix Compiler
//!
//! Compiles a backend-neutral table matrix plus a column-specification string
//! into LaTeX or OpenDocument output.
//!
//! This module provides:
//! - Cell content tokenizing and cell directive extraction (`~~~`, `_`, `>`, ...)
//! - Row invariant checks (spans and covered placeholders)
//! - Indentation expansion, multicolumn groups and trimmed partial rules
//! - Width allocation over unspecified columns
//!
//! # Architecture
//!
//! ```text
//! TableDefinition -> compile_table (measure, then format) -> TableLayout -> latex | odt
//! ```
//!
//! # Example
//!
//! ```
//! use tabset::core::context::RenderContext;
//! use tabset::core::table::{render_latex, Cell, Row, TableDefinition};
//!
//! let table = TableDefinition::new(vec![
//!     Row::new(vec![Cell::text("Name"), Cell::text("Value")]).header(),
//!     Row::new(vec![Cell::text("a"), Cell::text("1")]),
//! ])
//! .with_alignment("l,r");
//!
//! let mut ctx = RenderContext::default();
//! let latex = render_latex(&table, &mut ctx).unwrap();
//! assert!(latex.body().contains("Name & Value \\\\"));
//! ```

mod content;
mod directive;
pub mod latex;
mod layout;
mod matrix;
pub mod odt;

#[cfg(test)]
mod tests;

use crate::core::context::RenderContext;
use crate::utils::error::TableResult;

// Re-export public API
pub use content::{is_blank, normalize_spaces, plain_text, Inline};
pub use directive::{CellDirective, Underline, INDENT_MARKER, MULTICOLUMN_FORMAT};
pub use latex::LatexTable;
pub use layout::{compile_table, resolve_widths, CompiledCell, CompiledRow, Rule, TableLayout};
pub use matrix::{Cell, Environment, Row, TableAttributes, TableDefinition, TableNote};
pub use odt::{document_content, document_styles, DocumentStyles};

/// Compile and render a table to LaTeX
pub fn render_latex(def: &TableDefinition, ctx: &mut RenderContext) -> TableResult<LatexTable> {
    let layout = compile_table(def, ctx)?;
    Ok(latex::render_table(&layout, ctx))
}

/// Compile and render a table to OpenDocument XML
///
/// The table's column and cell styles are added to the context's automatic styles.
pub fn render_odt(def: &TableDefinition, ctx: &mut RenderContext) -> TableResult<String> {
    let layout = compile_table(def, ctx)?;
    odt::render_table(&layout, ctx)
}
