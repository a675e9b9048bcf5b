//! Float rows
//!
//! Tables set side by side inside one `table` float with the `floatrow`
//! package. Each table becomes a `\ttabbox` holding the table body and its
//! caption.

use std::fmt::Write;

use crate::core::context::RenderContext;
use crate::core::table::{render_latex, LatexTable, TableDefinition};
use crate::utils::error::TableResult;

/// Render tables side by side
///
/// Tables are counted in order. The first table that fails to compile aborts
/// the float row; tables before it have already consumed their numbers.
pub fn render_float_row(tables: &[TableDefinition], ctx: &mut RenderContext) -> TableResult<String> {
    let rendered = tables
        .iter()
        .map(|table| render_latex(table, ctx))
        .collect::<TableResult<Vec<_>>>()?;
    Ok(float_row(&rendered))
}

/// Wrap already rendered tables into a float row
pub fn float_row(tables: &[LatexTable]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\\begin{{table}}");
    let _ = writeln!(out, "\\begin{{floatrow}}");
    for table in tables {
        let _ = writeln!(out, "\\ttabbox{{");
        let _ = writeln!(out, "{{{}}}", table.body());
        let _ = writeln!(out, "}}{{{}", table.caption);
        let _ = writeln!(out, "}}");
    }
    let _ = writeln!(out, "\\end{{floatrow}}");
    let _ = write!(out, "\\end{{table}}");
    out
}
