//! # tabset
//!
//! Table layout engine for scientific documents, rendering to LaTeX
//! (booktabs) and OpenDocument.
//!
//! ## Features
//!
//! - **Column DSL**: `p[0.2,indent_fraction=0.15],l,S[table-format=2.1]`
//! - **Indentation**: `~~~` markers split paragraph columns into nested levels
//! - **Spans and rules**: `>`/`2>` multicolumn sentinels, `_`/`2_` underlines,
//!   trimmed `\cmidrule`s
//! - **Table notes**: `threeparttable` notes with symbol labels
//! - **Numbering**: tables numbered within headings, `tab:` reference labels
//! - **WASM Support**: Compiles to WebAssembly for browser usage
//!
//! ## Usage Examples
//!
//! ### Building a table in code
//!
//! ```rust
//! use tabset::{render_latex, Cell, RenderContext, Row, TableDefinition};
//!
//! let table = TableDefinition::new(vec![
//!     Row::new(vec![Cell::text("Group"), Cell::text("N")]).header(),
//!     Row::new(vec![Cell::text("~~~ Treated"), Cell::text("12")]),
//! ])
//! .with_alignment("p[0.3],r");
//!
//! let mut ctx = RenderContext::default();
//! let latex = render_latex(&table, &mut ctx).unwrap();
//! assert!(latex.head.contains("\\toprule"));
//! ```
//!
//! ### Rendering table markup
//!
//! ```rust
//! use tabset::{render_document, OutputFormat, RenderOptions};
//!
//! let markup = r#"
//!     <table>
//!       <options alignment="l,r"/>
//!       <row header="true"><cell>Name</cell><cell>Value</cell></row>
//!       <row><cell>a</cell><cell>1</cell></row>
//!     </table>
//! "#;
//!
//! let output = render_document(markup, OutputFormat::Latex, RenderOptions::default()).unwrap();
//! assert!(output.output.contains("Name & Value"));
//! ```

use std::fmt;
use std::str::FromStr;

use log::debug;

/// Core engines
pub mod core;

/// Data layer - static mappings and constants
pub mod data;

/// Feature modules - document-level table features
pub mod features;

/// Utility modules
pub mod utils;

/// WASM bindings (feature-gated)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export core types and functions
pub use crate::core::colspec::{parse_column_definitions, parse_column_specifiers, parse_options};
pub use crate::core::context::{RenderContext, RenderOptions};
pub use crate::core::table::{
    compile_table, render_latex, render_odt, Cell, Inline, LatexTable, Row, TableAttributes,
    TableDefinition, TableLayout, TableNote,
};

// Re-export data modules
pub use data::constants;
pub use data::NoteSymbolStyle;

// Re-export feature modules
pub use features::floats;
pub use features::markup;
pub use features::notes;
pub use features::refs;

// Re-export utilities
pub use utils::error::{RenderWarning, TableError, TableResult};

use crate::core::table::odt;
use crate::features::markup::Block;

/// Output backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Latex,
    /// OpenDocument `content.xml`
    Odt,
}

impl FromStr for OutputFormat {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latex" | "tex" => Ok(OutputFormat::Latex),
            "odt" | "opendocument" => Ok(OutputFormat::Odt),
            other => Err(TableError::markup(format!("unknown output format '{}'", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Latex => write!(f, "latex"),
            OutputFormat::Odt => write!(f, "odt"),
        }
    }
}

/// A rendered document with its diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub output: String,
    pub warnings: Vec<RenderWarning>,
    /// Tables replaced by an error marker
    pub failed_tables: usize,
}

/// Render a markup document of headings, tables and float rows
///
/// Blocks are rendered in document order with a single [`RenderContext`].
/// With `ignore_errors` set, a table that fails to compile is replaced by an
/// error marker and reported as a warning; otherwise the first failing table
/// aborts the render.
pub fn render_document(
    markup: &str,
    format: OutputFormat,
    options: RenderOptions,
) -> TableResult<RenderOutput> {
    options.validate()?;
    let blocks = markup::parse_document(markup)?;
    let mut ctx = RenderContext::new(options);
    let mut parts = Vec::new();
    let mut failed_tables = 0;

    for block in &blocks {
        let rendered = match block {
            Block::Heading(level) => {
                ctx.enter_heading(*level);
                continue;
            }
            Block::Table(table) => match format {
                OutputFormat::Latex => render_latex(table, &mut ctx).map(|t| t.to_float()),
                OutputFormat::Odt => render_odt(table, &mut ctx),
            },
            Block::FloatRow(tables) => match format {
                OutputFormat::Latex => floats::render_float_row(tables, &mut ctx),
                OutputFormat::Odt => tables
                    .iter()
                    .map(|table| render_odt(table, &mut ctx))
                    .collect::<TableResult<Vec<_>>>()
                    .map(|parts| parts.concat()),
            },
        };

        match rendered {
            Ok(part) => parts.push(part),
            Err(err) if ctx.options.ignore_errors => {
                failed_tables += 1;
                ctx.warn(RenderWarning::with_suggestion(
                    format!("table not rendered: {}", err),
                    "the table was replaced by an error marker",
                ));
                parts.push(error_marker(format, &err));
            }
            Err(err) => return Err(err),
        }
    }

    let output = match format {
        OutputFormat::Latex => parts.join("\n\n"),
        OutputFormat::Odt => {
            let auto_styles = ctx.take_auto_styles();
            odt::document_content(ctx.options.outline_level, &auto_styles, &parts.concat())?
        }
    };
    debug!("rendered {} blocks as {}", blocks.len(), format);

    Ok(RenderOutput {
        output,
        warnings: ctx.take_warnings(),
        failed_tables,
    })
}

fn error_marker(format: OutputFormat, err: &TableError) -> String {
    let message = err.to_string();
    match format {
        OutputFormat::Latex => message
            .lines()
            .map(|line| format!("% tabset: {}", line))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Odt => format!(
            "<!-- tabset: {} -->",
            quick_xml::escape::escape(&message.replace("--", "- -"))
        ),
    }
}
