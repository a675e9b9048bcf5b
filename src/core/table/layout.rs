//! Table matrix compiler
//!
//! Turns a [`TableDefinition`] into a backend-neutral [`TableLayout`]: resolved
//! column specifiers, indentation-expanded physical columns, column widths,
//! and per-row cells and rule segments. Both backends render from the layout.
//!
//! Compilation is two-pass. The first pass extracts the cell directives and
//! measures the indentation depth of every column; the second pass formats
//! the rows against the expanded columns.

use indexmap::IndexMap;
use log::debug;

use super::content::{is_blank, Inline};
use super::directive::{CellDirective, Underline};
use super::matrix::{TableAttributes, TableDefinition, TableNote};
use crate::core::colspec::{resolve_columns, ColumnSpecifier, OptionValue};
use crate::core::context::RenderContext;
use crate::features::notes::note_target;
use crate::utils::error::{TableError, TableResult};

/// Horizontal rule below a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Across the whole table
    Full,
    /// Physical columns `from..=to` (1-based), trimmed where they do not
    /// touch the table edge
    Partial {
        from: usize,
        to: usize,
        trim_left: bool,
        trim_right: bool,
    },
}

impl Rule {
    /// Rule over physical columns `from..=to` of a table `total` columns wide
    pub fn over(from: usize, to: usize, total: usize) -> Self {
        if from == 1 && to == total {
            Rule::Full
        } else {
            Rule::Partial {
                from,
                to,
                trim_left: from != 1,
                trim_right: to != total,
            }
        }
    }

    /// Trim code such as `lr`
    pub fn trim(&self) -> String {
        match self {
            Rule::Full => String::new(),
            Rule::Partial {
                trim_left,
                trim_right,
                ..
            } => {
                let mut trim = String::new();
                if *trim_left {
                    trim.push('l');
                }
                if *trim_right {
                    trim.push('r');
                }
                trim
            }
        }
    }
}

/// A cell positioned in the physical column grid
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCell {
    /// 0-based logical column
    pub column: usize,
    /// Logical columns occupied
    pub span: usize,
    pub indent: usize,
    /// 1-based physical column the content starts in
    pub from: usize,
    /// Physical columns the content occupies
    pub physical_span: usize,
    /// Specifier of the multicolumn group, when the cell needs one
    pub multicolumn: Option<ColumnSpecifier>,
    pub content: Vec<Inline>,
    pub heading_level: u8,
    pub vertical: bool,
    /// Fraction of the text width covered by the cell, indentation excluded
    pub width: f64,
}

/// A formatted row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledRow {
    pub cells: Vec<CompiledCell>,
    pub rules: Vec<Rule>,
    /// Per logical column, whether a rule runs below it
    pub underlined: Vec<bool>,
    pub header: bool,
    pub top_space: bool,
    pub bottom_space: bool,
}

/// A compiled table, ready for a backend
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    /// Label or dotted table number
    pub name: String,
    /// Dotted table number
    pub number: String,
    /// Reference label, `tab:<name>`
    pub label: String,
    /// Prefix of the table note labels, `tn:<name>`
    pub note_prefix: String,
    /// Indentation depth per logical column
    pub depths: Vec<usize>,
    /// Resolved specifier per logical column
    pub columns: Vec<ColumnSpecifier>,
    /// Specifiers after indentation expansion
    pub physical_columns: Vec<ColumnSpecifier>,
    /// Width per logical column, summing to the total width
    pub widths: Vec<f64>,
    pub rows: Vec<CompiledRow>,
    pub caption: Vec<Inline>,
    pub notes: Vec<TableNote>,
    pub attributes: TableAttributes,
}

impl TableLayout {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn physical_column_count(&self) -> usize {
        self.physical_columns.len()
    }

    /// Reference target of a note label as used in `\tnotex` and `\label`
    pub fn note_label(&self, label: &str, ctx: &RenderContext) -> String {
        format!(
            "{}:{}",
            self.note_prefix,
            note_target(label, ctx.options.note_symbols)
        )
    }
}

/// Compile a table
///
/// Counts the table in `ctx` before anything can fail, so a table that fails
/// to compile still consumes its number.
pub fn compile_table(def: &TableDefinition, ctx: &mut RenderContext) -> TableResult<TableLayout> {
    let number = ctx.next_table_number();
    let name = def
        .attributes
        .label
        .clone()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| number.clone());
    let label = ctx.register_table(&name);
    let note_prefix = ctx.make_target(&format!("tn:{}", name));

    let column_count = def.validate()?;
    let ignore_errors = ctx.options.ignore_errors;
    let total_width = def.attributes.total_width.unwrap_or(ctx.options.total_width);

    let (columns, widths) = resolve_layout_columns(&def.attributes, column_count, total_width, ctx)?;

    // First pass: directives and indentation depth
    let mut warnings = Vec::new();
    let mut extracted: Vec<Vec<Option<(CellDirective, Vec<Inline>)>>> =
        Vec::with_capacity(def.rows.len());
    let mut depths = vec![0; column_count];
    for row in &def.rows {
        let mut cells = Vec::with_capacity(row.cells.len());
        for (i, cell) in row.cells.iter().enumerate() {
            if cell.covered {
                cells.push(None);
                continue;
            }
            let (directive, content) =
                CellDirective::extract(&cell.content, ignore_errors, &mut warnings)?;
            depths[i] = depths[i].max(directive.indent_level);
            cells.push(Some((directive, content)));
        }
        extracted.push(cells);
    }
    ctx.extend_warnings(warnings);

    let physical_columns: Vec<ColumnSpecifier> = columns
        .iter()
        .zip(&depths)
        .flat_map(|(column, depth)| column.indent(*depth))
        .collect();

    let grid = Grid::new(&depths);

    // Second pass: rows
    let mut rows = Vec::with_capacity(def.rows.len());
    for (r, (row, cells)) in def.rows.iter().zip(extracted).enumerate() {
        let mut compiled = CompiledRow {
            underlined: vec![false; column_count],
            header: row.header,
            top_space: row.top_space,
            bottom_space: row.bottom_space,
            ..Default::default()
        };

        let mut skip = 0;
        for (i, (cell, parts)) in row.cells.iter().zip(cells).enumerate() {
            if skip > 0 {
                skip -= 1;
                if !cell.covered && !is_blank(&cell.content) {
                    debug!(
                        "row {}: dropping content of column {} consumed by a span",
                        r,
                        i + 1
                    );
                }
                continue;
            }
            let Some((directive, content)) = parts else {
                continue;
            };

            let span = directive.span(cell.span);
            if i + span > column_count {
                return Err(TableError::StructuralMismatch {
                    row: r,
                    expected: column_count,
                    actual: i + span,
                });
            }
            skip = span - 1;

            let indent = directive.indent_level;
            let from = grid.offset(i) + indent + 1;
            let physical_span = grid.depth_sum(i, i + span) - indent + span;

            let multicolumn = if physical_span > 1 || directive.force_multicolumn {
                let align = match directive.column_specifier {
                    Some(ref column) => column.clone(),
                    None => {
                        let anchor = &physical_columns[from - 1];
                        let mut align = anchor.get_n_definition(indent)?;
                        if anchor.multicolumn_definitions().is_none() && span > 1 {
                            let extra: f64 = columns[i + 1..i + span]
                                .iter()
                                .filter_map(ColumnSpecifier::fraction_width)
                                .sum();
                            if align.fraction_width().is_some() && extra > 0.0 {
                                align = align.widened(extra);
                            }
                        }
                        align
                    }
                };
                Some(grid.edge_padding(
                    align,
                    from,
                    physical_span,
                    def.attributes.leave_table_padding,
                ))
            } else {
                None
            };

            match directive.underline {
                Some(Underline::Midrule) => {
                    compiled.rules.push(Rule::Full);
                    compiled.underlined.iter_mut().for_each(|u| *u = true);
                }
                Some(Underline::Columns(width)) => {
                    let mut end = i + width.max(span);
                    if end > column_count {
                        debug!(
                            "row {}: clamping underline of column {} to the table edge",
                            r,
                            i + 1
                        );
                        end = column_count;
                    }
                    compiled
                        .rules
                        .push(Rule::over(from, grid.offset(end), grid.total));
                    compiled.underlined[i..end].iter_mut().for_each(|u| *u = true);
                }
                None => {}
            }

            compiled.cells.push(CompiledCell {
                column: i,
                span,
                indent,
                from,
                physical_span,
                multicolumn,
                content,
                heading_level: cell.heading_level,
                vertical: cell.vertical,
                width: widths[i..i + span].iter().sum::<f64>()
                    - indent_share(&physical_columns[grid.offset(i)], indent, widths[i]),
            });
        }

        for &(start, end) in &row.underlines {
            if start < 1 || end < start || end > column_count {
                return Err(TableError::InvalidRule {
                    row: r,
                    start,
                    end,
                    columns: column_count,
                });
            }
            compiled.rules.push(Rule::over(
                grid.offset(start - 1) + 1,
                grid.offset(end),
                grid.total,
            ));
            compiled.underlined[start - 1..end]
                .iter_mut()
                .for_each(|u| *u = true);
        }

        rows.push(compiled);
    }

    if let Some(last_header) = rows.iter_mut().rev().find(|row| row.header) {
        if last_header.rules.is_empty() {
            last_header.rules.push(Rule::Full);
            last_header.underlined.iter_mut().for_each(|u| *u = true);
        }
    }

    for note in &def.notes {
        let target = note_target(&note.label, ctx.options.note_symbols);
        ctx.register_note(&note_prefix, &target);
    }

    Ok(TableLayout {
        name,
        number,
        label,
        note_prefix,
        depths,
        columns,
        physical_columns,
        widths,
        rows,
        caption: def.caption.clone(),
        notes: def.notes.clone(),
        attributes: def.attributes.clone(),
    })
}

/// Part of `width` taken up by the first `indent` levels of an indented column
fn indent_share(column: &ColumnSpecifier, indent: usize, width: f64) -> f64 {
    let levels = column.indent_widths();
    let total: f64 = levels.iter().sum();
    if indent == 0 || total <= 0.0 {
        return 0.0;
    }
    width * levels.iter().take(indent).sum::<f64>() / total
}

/// Logical to physical column arithmetic
struct Grid {
    /// Physical columns before each logical column, plus the total at the end
    offsets: Vec<usize>,
    depths: Vec<usize>,
    total: usize,
}

impl Grid {
    fn new(depths: &[usize]) -> Self {
        let mut offsets = Vec::with_capacity(depths.len() + 1);
        let mut acc = 0;
        for depth in depths {
            offsets.push(acc);
            acc += depth + 1;
        }
        offsets.push(acc);
        Self {
            offsets,
            depths: depths.to_vec(),
            total: acc,
        }
    }

    /// Physical columns before logical column `i`
    fn offset(&self, i: usize) -> usize {
        self.offsets[i]
    }

    fn depth_sum(&self, start: usize, end: usize) -> usize {
        self.depths[start..end].iter().sum()
    }

    /// Drop the default padding on the sides of a group that touch the table edge
    fn edge_padding(
        &self,
        mut align: ColumnSpecifier,
        from: usize,
        physical_span: usize,
        leave_table_padding: bool,
    ) -> ColumnSpecifier {
        if leave_table_padding {
            return align;
        }
        if from == 1 {
            align = align.no_left_padding();
        }
        if from - 1 + physical_span == self.total {
            align = align.no_right_padding();
        }
        align
    }
}

/// Column specifiers and widths for a table
fn resolve_layout_columns(
    attributes: &TableAttributes,
    column_count: usize,
    total_width: f64,
    ctx: &mut RenderContext,
) -> TableResult<(Vec<ColumnSpecifier>, Vec<f64>)> {
    let ignore_errors = ctx.options.ignore_errors;

    if !attributes.widths.is_empty() {
        if attributes.widths.len() != column_count {
            return Err(TableError::invalid_width(
                format_widths(&attributes.widths),
                format!("expected {} widths", column_count),
            ));
        }
        let widths = resolve_widths(&attributes.widths, total_width, true)?;

        let columns = if attributes.alignment.trim().is_empty() {
            widths
                .iter()
                .map(|w| ColumnSpecifier::new('p', vec![OptionValue::Float(*w)], IndexMap::new()))
                .collect::<TableResult<Vec<_>>>()?
        } else {
            let (columns, warnings) =
                resolve_columns(&attributes.alignment, column_count, ignore_errors)?;
            ctx.extend_warnings(warnings);
            columns
        };
        return Ok((columns, widths));
    }

    let (columns, warnings) = resolve_columns(&attributes.alignment, column_count, ignore_errors)?;
    ctx.extend_warnings(warnings);

    let raw: Vec<f64> = columns
        .iter()
        .map(|c| c.fraction_width().unwrap_or(0.0))
        .collect();
    let widths = resolve_widths(&raw, total_width, false)?;
    Ok((columns, widths))
}

/// Distribute the unallocated width over unspecified (`0`) columns and scale
/// the result to `total_width`
///
/// `explicit` widths summing to more than one are an error; widths derived
/// from column specifiers are normalised instead.
pub fn resolve_widths(raw: &[f64], total_width: f64, explicit: bool) -> TableResult<Vec<f64>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(w) = raw.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
        return Err(TableError::invalid_width(
            w.to_string(),
            "column widths must be non-negative",
        ));
    }
    if !(total_width.is_finite() && total_width > 0.0) {
        return Err(TableError::invalid_width(
            total_width.to_string(),
            "total width must be a positive number",
        ));
    }

    let allocated: f64 = raw.iter().sum();
    if explicit && allocated > 1.0 + 1e-9 {
        return Err(TableError::invalid_width(
            format_widths(raw),
            "column widths add up to more than 1",
        ));
    }

    let unspecified = raw.iter().filter(|w| **w == 0.0).count();
    let mut widths = raw.to_vec();
    if unspecified > 0 {
        let share = (1.0 - allocated).max(0.0) / unspecified as f64;
        if share == 0.0 {
            debug!("no width left for {} unspecified columns", unspecified);
        }
        for w in widths.iter_mut().filter(|w| **w == 0.0) {
            *w = share;
        }
    }

    let sum: f64 = widths.iter().sum();
    if (sum - 1.0).abs() > 1e-9 {
        debug!("normalising column widths {} (sum {})", format_widths(&widths), sum);
        widths.iter_mut().for_each(|w| *w /= sum);
    }

    Ok(widths.into_iter().map(|w| w * total_width).collect())
}

fn format_widths(widths: &[f64]) -> String {
    widths
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
