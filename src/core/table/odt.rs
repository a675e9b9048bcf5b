//! OpenDocument backend
//!
//! Writes a [`TableLayout`] as `table:table` XML. Column and cell styles are
//! not part of the table body; they are collected as automatic styles on the
//! [`RenderContext`] and must be placed in the document's
//! `office:automatic-styles`.

use log::debug;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::content::{is_blank, Inline};
use super::layout::{CompiledCell, TableLayout};
use crate::core::context::RenderContext;
use crate::data::constants::{
    ODT_CAPTION_STYLE, ODT_LEGEND_STYLE, ODT_STRONG_STYLE, ODT_SUPERSCRIPT_STYLE,
    ODT_VERTICAL_STYLE,
};
use crate::data::odt_paragraph_style;
use crate::features::notes::note_term;
use crate::utils::error::TableResult;
use crate::utils::units::number_to_uppercase;

const CELL_PADDING_CM: f64 = 0.10;
const SPACING_CM: f64 = 0.05;
const INDENT_CM: f64 = 0.25;
const RULE_BORDER: &str = "0.5pt solid #000000";

type XmlWriter = Writer<Vec<u8>>;

/// Render a compiled table and record its styles on `ctx`
pub fn render_table(layout: &TableLayout, ctx: &mut RenderContext) -> TableResult<String> {
    let name = format!("Table{}", layout.number.replace('.', "_"));
    let mut body = Writer::new(Vec::new());
    let mut styles = Writer::new(Vec::new());

    write_caption(&mut body, layout, &name, ctx)?;

    start(
        &mut body,
        "table:table",
        &[
            ("table:name", name.as_str()),
            ("table:style-name", name.as_str()),
            ("table:template-name", "Default Style"),
        ],
    )?;

    let column_styles: Vec<String> = (0..layout.column_count())
        .map(|c| format!("{}.{}", name, number_to_uppercase(c)))
        .collect();

    for (style, width) in column_styles.iter().zip(&layout.widths) {
        let rel_width = format!("{}*", (width * 1000.0).floor() as u64);
        start(
            &mut styles,
            "style:style",
            &[("style:name", style.as_str()), ("style:family", "table-column")],
        )?;
        empty(
            &mut styles,
            "style:table-column-properties",
            &[("style:rel-column-width", rel_width.as_str())],
        )?;
        end(&mut styles, "style:style")?;

        empty(
            &mut body,
            "table:table-column",
            &[("table:style-name", style.as_str())],
        )?;
    }

    for (r, row) in layout.rows.iter().enumerate() {
        let row_style = format!("{}.{}", name, r + 1);
        start(
            &mut body,
            "table:table-row",
            &[("table:style-name", row_style.as_str())],
        )?;

        let previous_bottom = r > 0 && layout.rows[r - 1].bottom_space;
        let spacing = usize::from(row.top_space) + usize::from(previous_bottom);
        let padding_top = CELL_PADDING_CM + SPACING_CM * spacing as f64;

        for cell in &row.cells {
            let cell_style = format!("{}{}", column_styles[cell.column], r + 1);
            write_cell_style(
                &mut styles,
                &cell_style,
                padding_top,
                cell.indent,
                row.underlined[cell.column],
            )?;

            let spanned = cell.span.to_string();
            let mut attrs = vec![
                ("table:style-name", cell_style.as_str()),
                ("office:value-type", "string"),
            ];
            if cell.span > 1 {
                attrs.push(("table:number-columns-spanned", spanned.as_str()));
            }
            start(&mut body, "table:table-cell", &attrs)?;
            write_cell_content(&mut body, cell, ctx)?;
            end(&mut body, "table:table-cell")?;

            for _ in 1..cell.span {
                empty(&mut body, "table:covered-table-cell", &[])?;
            }
        }

        end(&mut body, "table:table-row")?;
    }

    end(&mut body, "table:table")?;

    for note in &layout.notes {
        start(
            &mut body,
            "text:p",
            &[("text:style-name", ODT_LEGEND_STYLE)],
        )?;
        write_note_term(&mut body, &note.label, ctx)?;
        if !note.definition.is_empty() {
            text(&mut body, " ")?;
            write_inlines(&mut body, &note.definition, ctx)?;
        }
        end(&mut body, "text:p")?;
    }

    ctx.push_auto_style(into_string(styles));
    Ok(into_string(body))
}

fn write_caption(
    w: &mut XmlWriter,
    layout: &TableLayout,
    name: &str,
    ctx: &RenderContext,
) -> TableResult<()> {
    let ref_name = format!("ref{}", name);

    start(w, "text:p", &[("text:style-name", ODT_CAPTION_STYLE)])?;
    start(w, "text:span", &[("text:style-name", ODT_STRONG_STYLE)])?;
    text(w, "Table ")?;
    start(
        w,
        "text:sequence",
        &[
            ("text:ref-name", ref_name.as_str()),
            ("text:name", "Table"),
            ("text:formula", "ooow:Table+1"),
            ("style:num-format", "1"),
        ],
    )?;
    text(w, &layout.number)?;
    end(w, "text:sequence")?;
    if !layout.caption.is_empty() {
        text(w, ": ")?;
    }
    end(w, "text:span")?;
    write_inlines(w, &layout.caption, ctx)?;
    end(w, "text:p")
}

fn write_cell_style(
    w: &mut XmlWriter,
    name: &str,
    padding_top: f64,
    indent: usize,
    underlined: bool,
) -> TableResult<()> {
    let padding = cm(CELL_PADDING_CM);
    let padding_left = cm(CELL_PADDING_CM + INDENT_CM * indent as f64);
    let padding_top = cm(padding_top);

    let mut attrs = vec![
        ("fo:padding-left", padding_left.as_str()),
        ("fo:padding-right", padding.as_str()),
        ("fo:padding-top", padding_top.as_str()),
        ("fo:padding-bottom", padding.as_str()),
        ("style:vertical-align", "bottom"),
    ];
    if underlined {
        attrs.push(("fo:border-bottom", RULE_BORDER));
    }

    start(
        w,
        "style:style",
        &[("style:name", name), ("style:family", "table-cell")],
    )?;
    empty(w, "style:table-cell-properties", &attrs)?;
    end(w, "style:style")
}

fn write_cell_content(w: &mut XmlWriter, cell: &CompiledCell, ctx: &RenderContext) -> TableResult<()> {
    let style = odt_paragraph_style(cell.heading_level);
    if is_blank(&cell.content) {
        return empty(w, "text:p", &[("text:style-name", style)]);
    }

    start(w, "text:p", &[("text:style-name", style)])?;
    if cell.vertical {
        start(w, "text:span", &[("text:style-name", ODT_VERTICAL_STYLE)])?;
        write_inlines(w, &cell.content, ctx)?;
        end(w, "text:span")?;
    } else {
        write_inlines(w, &cell.content, ctx)?;
    }
    end(w, "text:p")
}

fn write_inlines(w: &mut XmlWriter, inlines: &[Inline], ctx: &RenderContext) -> TableResult<()> {
    for inline in inlines {
        match inline {
            Inline::Str(s) => text(w, s)?,
            Inline::Space => text(w, " ")?,
            Inline::Strong(inner) => {
                start(w, "text:span", &[("text:style-name", ODT_STRONG_STYLE)])?;
                write_inlines(w, inner, ctx)?;
                end(w, "text:span")?;
            }
            Inline::Raw { format, text } if format == "opendocument" || format == "odt" => {
                raw(w, text)?;
            }
            Inline::Raw { format, text } => {
                debug!("dropping raw {} inline {:?} from ODT output", format, text);
            }
            Inline::NoteRef(label) => write_note_term(w, label, ctx)?,
        }
    }
    Ok(())
}

fn write_note_term(w: &mut XmlWriter, label: &str, ctx: &RenderContext) -> TableResult<()> {
    let term = note_term(label, ctx.options.note_symbols);
    start(w, "text:span", &[("text:style-name", ODT_SUPERSCRIPT_STYLE)])?;
    text(w, term.trim_start_matches('\\'))?;
    end(w, "text:span")
}

/// Auxiliary declarations shared by every rendered table
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStyles {
    /// Paragraph and text styles for `office:automatic-styles`
    pub styles: String,
    /// `text:sequence-decls` block for the document body
    pub sequence_decls: String,
}

/// Styles referenced by the table output and the caption sequence declarations
pub fn document_styles(outline_level: usize) -> TableResult<DocumentStyles> {
    let mut w = Writer::new(Vec::new());

    start(
        &mut w,
        "style:style",
        &[
            ("style:name", "Keep_20_Caption_With_Next"),
            ("style:family", "paragraph"),
            ("style:parent-style-name", "Caption"),
        ],
    )?;
    empty(
        &mut w,
        "style:paragraph-properties",
        &[("fo:keep-together", "always")],
    )?;
    end(&mut w, "style:style")?;

    start(
        &mut w,
        "style:style",
        &[("style:name", ODT_VERTICAL_STYLE), ("style:family", "text")],
    )?;
    empty(
        &mut w,
        "style:text-properties",
        &[
            ("style:text-rotation-angle", "90"),
            ("style:text-rotation-scale", "line-height"),
        ],
    )?;
    end(&mut w, "style:style")?;

    start(
        &mut w,
        "style:style",
        &[
            ("style:name", ODT_LEGEND_STYLE),
            ("style:family", "paragraph"),
            ("style:parent-style-name", "Standard"),
        ],
    )?;
    empty(
        &mut w,
        "style:paragraph-properties",
        &[
            ("fo:margin-left", "0.1799in"),
            ("fo:margin-right", "0in"),
            ("fo:margin-top", "0.1598in"),
            ("fo:margin-bottom", "0.2in"),
            ("loext:contextual-spacing", "true"),
            ("fo:text-indent", "0in"),
        ],
    )?;
    end(&mut w, "style:style")?;

    let mut decls = Writer::new(Vec::new());
    let level = outline_level.to_string();
    start(&mut decls, "text:sequence-decls", &[])?;
    for name in ["Illustration", "Table", "Text", "Drawing"] {
        empty(
            &mut decls,
            "text:sequence-decl",
            &[
                ("text:display-outline-level", level.as_str()),
                ("text:name", name),
                ("text:separation-character", "."),
            ],
        )?;
    }
    end(&mut decls, "text:sequence-decls")?;

    Ok(DocumentStyles {
        styles: into_string(w),
        sequence_decls: into_string(decls),
    })
}

const NAMESPACES: [(&str, &str); 6] = [
    ("xmlns:office", "urn:oasis:names:tc:opendocument:xmlns:office:1.0"),
    ("xmlns:style", "urn:oasis:names:tc:opendocument:xmlns:style:1.0"),
    ("xmlns:text", "urn:oasis:names:tc:opendocument:xmlns:text:1.0"),
    ("xmlns:table", "urn:oasis:names:tc:opendocument:xmlns:table:1.0"),
    ("xmlns:fo", "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0"),
    ("xmlns:loext", "urn:org:documentfoundation:names:experimental:office:xmlns:loext:1.0"),
];

/// A `content.xml` document holding the rendered tables
///
/// `auto_styles` are the styles collected on the render context, `body` the
/// concatenated table XML.
pub fn document_content(outline_level: usize, auto_styles: &[String], body: &str) -> TableResult<String> {
    let shared = document_styles(outline_level)?;
    let mut w = Writer::new(Vec::new());

    let mut attrs: Vec<(&str, &str)> = NAMESPACES.to_vec();
    attrs.push(("office:version", "1.2"));
    start(&mut w, "office:document-content", &attrs)?;

    start(&mut w, "office:automatic-styles", &[])?;
    raw(&mut w, &shared.styles)?;
    for style in auto_styles {
        raw(&mut w, style)?;
    }
    end(&mut w, "office:automatic-styles")?;

    start(&mut w, "office:body", &[])?;
    start(&mut w, "office:text", &[])?;
    raw(&mut w, &shared.sequence_decls)?;
    raw(&mut w, body)?;
    end(&mut w, "office:text")?;
    end(&mut w, "office:body")?;

    end(&mut w, "office:document-content")?;
    Ok(into_string(w))
}

fn cm(value: f64) -> String {
    format!("{:.2}cm", value)
}

fn start(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> TableResult<()> {
    let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
    w.write_event(Event::Start(element))?;
    Ok(())
}

fn empty(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> TableResult<()> {
    let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
    w.write_event(Event::Empty(element))?;
    Ok(())
}

fn end(w: &mut XmlWriter, name: &str) -> TableResult<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text(w: &mut XmlWriter, content: &str) -> TableResult<()> {
    w.write_event(Event::Text(BytesText::new(content)))?;
    Ok(())
}

/// Already serialized XML
fn raw(w: &mut XmlWriter, xml: &str) -> TableResult<()> {
    w.write_event(Event::Text(BytesText::from_escaped(xml)))?;
    Ok(())
}

fn into_string(w: XmlWriter) -> String {
    String::from_utf8_lossy(&w.into_inner()).into_owned()
}
