//! LaTeX backend
//!
//! Renders a [`TableLayout`] to booktabs LaTeX: the environment head with the
//! physical column specification, one line per row followed by its rules,
//! the tail, the `threeparttable` notes and the caption.

use std::fmt;
use std::fmt::Write;

use log::debug;

use super::content::Inline;
use super::layout::{CompiledCell, CompiledRow, Rule, TableLayout};
use super::matrix::Environment;
use crate::core::context::RenderContext;
use crate::data::latex_heading_prefix;
use crate::features::notes::note_term;
use crate::features::refs::label_to_latex;

const TOP_STRUT: &str = "\\rule{0pt}{2.6ex}";
const BOTTOM_STRUT: &str = "\\rule[-1.2ex]{0pt}{0pt}";

/// A table rendered to LaTeX, kept in pieces so float rows can rearrange them
#[derive(Debug, Clone, PartialEq)]
pub struct LatexTable {
    /// Environment head including `\toprule`
    pub head: String,
    pub rows: Vec<String>,
    /// `\bottomrule` and the end of the environment
    pub tail: String,
    /// `tablenotes` list closing the `threeparttable`, empty without notes
    pub notes: String,
    /// `\caption[..]{..}` (when captioned) and `\label{tab:..}`
    pub caption: String,
}

impl LatexTable {
    /// Environment, rows and notes
    pub fn body(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.head);
        for row in &self.rows {
            out.push_str(row);
        }
        out.push_str(&self.tail);
        out.push_str(&self.notes);
        out
    }

    /// The table as a standalone `table` float
    pub fn to_float(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\\begin{{table}}");
        let _ = writeln!(out, "{}", self.caption);
        let _ = writeln!(out, "{}", self.body());
        let _ = write!(out, "\\end{{table}}");
        out
    }
}

impl fmt::Display for LatexTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_float())
    }
}

/// Render a compiled table
pub fn render_table(layout: &TableLayout, ctx: &RenderContext) -> LatexTable {
    let has_notes = !layout.notes.is_empty();

    let mut head = String::new();
    if has_notes {
        let _ = writeln!(head, "\\begin{{threeparttable}}");
    }
    let _ = writeln!(head, "{}", environment_head(layout));
    let _ = writeln!(head, "\\toprule");

    let rows = layout
        .rows
        .iter()
        .map(|row| render_row(row, layout, ctx))
        .collect();

    let tail = format!(" \\bottomrule\n{}", environment_tail(layout));

    let notes = if has_notes {
        render_notes(layout, ctx)
    } else {
        String::new()
    };

    LatexTable {
        head,
        rows,
        tail,
        notes,
        caption: render_caption(layout, ctx),
    }
}

fn environment_head(layout: &TableLayout) -> String {
    let mut alignment: String = layout
        .physical_columns
        .iter()
        .map(|c| c.render())
        .collect();
    if !layout.attributes.leave_table_padding {
        alignment = format!("@{{}}{}@{{}}", alignment);
    }

    match layout.attributes.environment {
        Environment::Tabular => format!("\\begin{{tabular}}{{{}}}", alignment),
        Environment::Tabularx => format!(
            "\\begin{{tabularx}}{{{:.2}\\textwidth}}{{{}}}",
            layout.attributes.width, alignment
        ),
    }
}

fn environment_tail(layout: &TableLayout) -> &'static str {
    match layout.attributes.environment {
        Environment::Tabular => "\\end{tabular}",
        Environment::Tabularx => "\\end{tabularx}",
    }
}

/// One row: the cells separated by `&`, the row end and the rules
fn render_row(row: &CompiledRow, layout: &TableLayout, ctx: &RenderContext) -> String {
    let mut slots: Vec<String> = Vec::with_capacity(layout.physical_column_count());

    for (index, cell) in row.cells.iter().enumerate() {
        slots.extend((0..cell.indent).map(|_| String::new()));

        let mut content = render_cell_content(cell, layout, ctx);
        if index == 0 {
            if row.top_space {
                content.push_str(TOP_STRUT);
            }
            if row.bottom_space {
                content.push_str(BOTTOM_STRUT);
            }
        }

        match cell.multicolumn {
            Some(ref align) => slots.push(format!(
                "\\multicolumn{{{}}}{{{}}}{{{}}}",
                cell.physical_span,
                align.render(),
                content
            )),
            None => slots.push(content),
        }
    }

    let mut out = slots.join(" & ");
    out.push_str(" \\\\ \n");
    if !row.rules.is_empty() {
        for rule in &row.rules {
            out.push_str(&render_rule(rule));
        }
        out.push('\n');
    }
    out
}

fn render_cell_content(cell: &CompiledCell, layout: &TableLayout, ctx: &RenderContext) -> String {
    let text = render_inlines(&cell.content, layout, ctx);
    let text = format!("{}{}", latex_heading_prefix(cell.heading_level), text);
    if cell.vertical {
        format!("\\rotatebox{{90}}{{{}}}", text)
    } else {
        text
    }
}

/// `\midrule ` or `\cmidrule(lr){a-b} `
pub fn render_rule(rule: &Rule) -> String {
    match rule {
        Rule::Full => "\\midrule ".to_string(),
        Rule::Partial { from, to, .. } => {
            format!("\\cmidrule({}){{{}-{}}} ", rule.trim(), from, to)
        }
    }
}

/// Inline content as LaTeX
pub fn render_inlines(inlines: &[Inline], layout: &TableLayout, ctx: &RenderContext) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Str(s) => out.push_str(&escape_latex_text(s)),
            Inline::Space => out.push(' '),
            Inline::Strong(inner) => {
                let _ = write!(out, "\\textbf{{{}}}", render_inlines(inner, layout, ctx));
            }
            Inline::Raw { format, text } if format == "latex" || format == "tex" => {
                out.push_str(text)
            }
            Inline::Raw { format, text } => {
                debug!("dropping raw {} inline {:?} from LaTeX output", format, text);
            }
            Inline::NoteRef(label) => {
                let _ = write!(out, "\\tnotex{{{}}}", layout.note_label(label, ctx));
            }
        }
    }
    out
}

fn render_notes(layout: &TableLayout, ctx: &RenderContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "\\vspace{{.5\\skip\\footins}}");
    match layout.attributes.tablenotes_options {
        Some(ref options) if !options.is_empty() => {
            let _ = writeln!(out, "\\begin{{tablenotes}}[{}]", options);
        }
        _ => {
            let _ = writeln!(out, "\\begin{{tablenotes}}");
        }
    }

    for note in &layout.notes {
        let term = note_term(&note.label, ctx.options.note_symbols);
        let _ = writeln!(
            out,
            "\\item[{}] {} {}",
            term,
            label_to_latex(&layout.note_label(&note.label, ctx)),
            render_inlines(&note.definition, layout, ctx)
        );
    }

    let _ = writeln!(out, "\\end{{tablenotes}}");
    let _ = write!(out, "\\end{{threeparttable}}");
    out
}

fn render_caption(layout: &TableLayout, ctx: &RenderContext) -> String {
    let mut out = String::new();
    if !layout.caption.is_empty() {
        let text = render_inlines(&layout.caption, layout, ctx);
        match layout.attributes.caption_title {
            Some(ref title) => {
                let _ = write!(out, "\\caption[{}]{{{}}}", escape_latex_text(title), text);
            }
            None => {
                let _ = write!(out, "\\caption{{{}}}", text);
            }
        }
    }
    out.push_str(&label_to_latex(&layout.label));
    out
}

/// Escape special LaTeX characters in text
pub fn escape_latex_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(ch),
        }
    }
    out
}
