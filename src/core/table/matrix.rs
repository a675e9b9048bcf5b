//! Backend-neutral table matrix
//!
//! A [`TableDefinition`] is what the markup reader (or a caller building
//! tables by hand) hands to the compiler: rows of cells, table attributes,
//! an optional caption and the table notes.

use std::str::FromStr;

use super::content::Inline;
use crate::utils::error::{TableError, TableResult};

/// One cell of the matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: Vec<Inline>,
    /// Logical columns the cell occupies
    pub span: usize,
    /// 0 = body, 1 = heading, 2 = subheading
    pub heading_level: u8,
    /// Rotate the content by 90 degrees
    pub vertical: bool,
    /// Placeholder for a column consumed by a preceding span
    pub covered: bool,
}

impl Cell {
    pub fn new(content: Vec<Inline>) -> Self {
        Self {
            content,
            span: 1,
            heading_level: 0,
            vertical: false,
            covered: false,
        }
    }

    /// A cell whose content is tokenized from plain text
    pub fn text(text: &str) -> Self {
        Self::new(Inline::parse_text(text))
    }

    pub fn covered() -> Self {
        Self {
            covered: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_span(mut self, span: usize) -> Self {
        self.span = span;
        self
    }

    pub fn heading(mut self, level: u8) -> Self {
        self.heading_level = level;
        self
    }

    pub fn vertical(mut self) -> Self {
        self.vertical = true;
        self
    }
}

/// One row of the matrix
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// Rules below the row as 1-based inclusive logical column ranges
    pub underlines: Vec<(usize, usize)>,
    pub top_space: bool,
    pub bottom_space: bool,
    pub header: bool,
}

impl Row {
    /// A row taking `cells` as they are
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Default::default()
        }
    }

    /// A row that inserts `span - 1` covered placeholders after every spanning cell
    pub fn spanned(cells: Vec<Cell>) -> Self {
        let mut out = Vec::with_capacity(cells.len());
        for cell in cells {
            let span = cell.span;
            out.push(cell);
            out.extend((1..span).map(|_| Cell::covered()));
        }
        Self::new(out)
    }

    pub fn with_underlines(mut self, underlines: Vec<(usize, usize)>) -> Self {
        self.underlines = underlines;
        self
    }

    pub fn header(mut self) -> Self {
        self.header = true;
        self
    }

    /// Logical columns claimed by the row's cells
    pub fn span_sum(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| !c.covered)
            .map(|c| c.span.max(1))
            .sum()
    }
}

/// A table note, `label` → definition
#[derive(Debug, Clone, PartialEq)]
pub struct TableNote {
    pub label: String,
    pub definition: Vec<Inline>,
}

impl TableNote {
    pub fn new(label: impl Into<String>, definition: Vec<Inline>) -> Self {
        Self {
            label: label.into(),
            definition,
        }
    }
}

/// LaTeX table environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Tabular,
    Tabularx,
}

impl FromStr for Environment {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "tabular" => Ok(Environment::Tabular),
            "tabularx" => Ok(Environment::Tabularx),
            other => Err(TableError::markup(format!(
                "unknown table environment '{}'",
                other
            ))),
        }
    }
}

/// Per-table attributes
#[derive(Debug, Clone, PartialEq)]
pub struct TableAttributes {
    /// Column-specification DSL string
    pub alignment: String,
    pub environment: Environment,
    /// `tabularx` width as a fraction of the text width
    pub width: f64,
    /// Keep the default padding at the table edges
    pub leave_table_padding: bool,
    /// Table name; the table number is used when missing
    pub label: Option<String>,
    /// Short caption for the list of tables
    pub caption_title: Option<String>,
    /// Optional argument of the `tablenotes` environment
    pub tablenotes_options: Option<String>,
    /// Overrides the render option of the same name
    pub total_width: Option<f64>,
    /// Raw per-column fractions, `0` meaning unspecified
    pub widths: Vec<f64>,
}

impl Default for TableAttributes {
    fn default() -> Self {
        Self {
            alignment: String::new(),
            environment: Environment::Tabular,
            width: 1.0,
            leave_table_padding: false,
            label: None,
            caption_title: None,
            tablenotes_options: None,
            total_width: None,
            widths: Vec::new(),
        }
    }
}

/// A complete table as handed to the compiler
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableDefinition {
    pub rows: Vec<Row>,
    pub attributes: TableAttributes,
    pub caption: Vec<Inline>,
    pub notes: Vec<TableNote>,
}

impl TableDefinition {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn with_alignment(mut self, alignment: impl Into<String>) -> Self {
        self.attributes.alignment = alignment.into();
        self
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = Inline::parse_text(caption);
        self
    }

    pub fn with_notes(mut self, notes: Vec<TableNote>) -> Self {
        self.notes = notes;
        self
    }

    /// Logical column count, taken from the first row
    pub fn column_count(&self) -> usize {
        self.rows.first().map(Row::span_sum).unwrap_or(0)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check the row invariant and return the column count
    ///
    /// Every row must claim the same number of logical columns, and every
    /// spanning cell must be followed by exactly `span - 1` covered cells.
    pub fn validate(&self) -> TableResult<usize> {
        let expected = self.column_count();
        if expected == 0 {
            return Err(TableError::markup("table has no columns"));
        }

        for (index, row) in self.rows.iter().enumerate() {
            let actual = row.span_sum();
            if actual != expected {
                return Err(TableError::StructuralMismatch {
                    row: index,
                    expected,
                    actual,
                });
            }
            if row.cells.len() != expected || !placeholders_follow_spans(row) {
                return Err(TableError::StructuralMismatch {
                    row: index,
                    expected,
                    actual: row.cells.len(),
                });
            }
        }

        Ok(expected)
    }
}

fn placeholders_follow_spans(row: &Row) -> bool {
    let mut pending = 0;
    for cell in &row.cells {
        if pending > 0 {
            if !cell.covered {
                return false;
            }
            pending -= 1;
        } else if cell.covered {
            return false;
        } else {
            pending = cell.span.max(1) - 1;
        }
    }
    pending == 0
}
