//! Table markup reader
//!
//! Reads the XML table markup into [`TableDefinition`] values:
//!
//! ```xml
//! <table>
//!   <options alignment="p[0.3],l,r" label="results" width="0.4,0,0"/>
//!   <caption>All **results**</caption>
//!   <row header="true" underlines="2-3">
//!     <cell heading="1">Name</cell>
//!     <cell col_span="2" heading="1">Values</cell>
//!   </row>
//!   <row><cell>a</cell><cell repeat="2">1</cell></row>
//!   <footnotes><note label="*1">Rounded</note></footnotes>
//! </table>
//! ```
//!
//! [`parse_document`] reads a `<document>` of headings, tables and float rows.

use indexmap::IndexMap;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::table::{
    Cell, Environment, Inline, Row, TableAttributes, TableDefinition, TableNote,
};
use crate::utils::error::{TableError, TableResult};

/// A top-level block of a markup document
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading of the given level, restarts table numbering below it
    Heading(usize),
    Table(TableDefinition),
    /// Tables set side by side in one float
    FloatRow(Vec<TableDefinition>),
}

/// Parse a single `<table>` element
pub fn parse_table(markup: &str) -> TableResult<TableDefinition> {
    let mut reader = MarkupReader::new(markup);
    loop {
        match reader.next()? {
            Event::Start(e) if e.name().as_ref() == b"table" => {
                let table = reader.read_table()?;
                table.validate()?;
                return Ok(table);
            }
            Event::Empty(e) if e.name().as_ref() == b"table" => {
                return Err(reader.error("table has no rows"));
            }
            Event::Eof => return Err(reader.error("no <table> element found")),
            Event::Start(e) | Event::Empty(e) => {
                return Err(reader.error(format!("unexpected element <{}>", element_name(&e))))
            }
            _ => {}
        }
    }
}

/// Parse a document of headings, tables and float rows
///
/// The blocks may be wrapped in a `<document>` element. Tables are not
/// validated here; the compiler reports structural errors per table so one
/// bad table does not hide the others.
pub fn parse_document(markup: &str) -> TableResult<Vec<Block>> {
    let mut reader = MarkupReader::new(markup);
    let mut blocks = Vec::new();

    loop {
        match reader.next()? {
            Event::Start(e) => match e.name().as_ref() {
                b"document" => {}
                b"table" => blocks.push(Block::Table(reader.read_table()?)),
                b"floatrow" => blocks.push(Block::FloatRow(reader.read_float_row()?)),
                b"heading" => {
                    blocks.push(Block::Heading(heading_level(&e)?));
                    reader.skip(&e)?;
                }
                _ => {
                    return Err(reader.error(format!("unexpected element <{}>", element_name(&e))))
                }
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"document" => {}
                b"heading" => blocks.push(Block::Heading(heading_level(&e)?)),
                _ => {
                    return Err(reader.error(format!(
                        "unexpected empty element <{}/>",
                        element_name(&e)
                    )))
                }
            },
            Event::End(e) if e.name().as_ref() == b"document" => {}
            Event::Text(e) => {
                let text = e.unescape()?;
                if !text.trim().is_empty() {
                    debug!("ignoring text between blocks: {:?}", text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(blocks)
}

struct MarkupReader<'a> {
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
}

impl<'a> MarkupReader<'a> {
    fn new(markup: &'a str) -> Self {
        let mut reader = Reader::from_str(markup);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    fn next(&mut self) -> TableResult<Event<'static>> {
        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf)?;
        Ok(event.into_owned())
    }

    fn error(&self, message: impl std::fmt::Display) -> TableError {
        TableError::markup(format!(
            "{} (at byte {})",
            message,
            self.reader.buffer_position()
        ))
    }

    /// Skip everything up to the end of `start`
    fn skip(&mut self, start: &BytesStart) -> TableResult<()> {
        self.buf.clear();
        self.reader
            .read_to_end_into(start.name(), &mut self.buf)?;
        Ok(())
    }

    /// Body of a `<table>` element, up to and including `</table>`
    fn read_table(&mut self) -> TableResult<TableDefinition> {
        let mut table = TableDefinition::new(Vec::new());
        let mut has_options = false;
        let mut has_caption = false;

        loop {
            match self.next()? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"options" => {
                    if has_options {
                        return Err(self.error("there should only be one set of options"));
                    }
                    has_options = true;
                    apply_options(&mut table.attributes, &attributes(&e)?)
                        .map_err(|err| self.error(err))?;
                }
                Event::Start(e) => match e.name().as_ref() {
                    b"caption" => {
                        if has_caption {
                            return Err(self.error("there should only be one caption"));
                        }
                        has_caption = true;
                        table.caption = Inline::parse_text(&self.read_text(b"caption")?);
                    }
                    b"row" => {
                        let row = self.read_row(&e)?;
                        table.rows.push(row);
                    }
                    b"footnotes" => {
                        let notes = self.read_notes()?;
                        table.notes.extend(notes);
                    }
                    _ => {
                        return Err(
                            self.error(format!("unexpected element <{}> in table", element_name(&e)))
                        )
                    }
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"row" => {
                        let row = row_from_cells(&e, Vec::new()).map_err(|err| self.error(err))?;
                        table.rows.push(row);
                    }
                    b"caption" | b"footnotes" => {}
                    _ => {
                        return Err(
                            self.error(format!("unexpected element <{}/> in table", element_name(&e)))
                        )
                    }
                },
                Event::End(e) if e.name().as_ref() == b"table" => break,
                Event::Text(e) => {
                    let text = e.unescape()?;
                    if !text.trim().is_empty() {
                        debug!("ignoring text outside of cells: {:?}", text);
                    }
                }
                Event::Eof => return Err(self.error("unclosed <table>")),
                _ => {}
            }
        }

        Ok(table)
    }

    fn read_row(&mut self, start: &BytesStart) -> TableResult<Row> {
        let mut cells = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"cell" => {
                    let attrs = attributes(&e)?;
                    let text = self.read_text(b"cell")?;
                    push_cell(&mut cells, &text, &attrs).map_err(|err| self.error(err))?;
                }
                Event::Empty(e) if e.name().as_ref() == b"cell" => {
                    let attrs = attributes(&e)?;
                    push_cell(&mut cells, "", &attrs).map_err(|err| self.error(err))?;
                }
                Event::End(e) if e.name().as_ref() == b"row" => break,
                Event::Start(e) | Event::Empty(e) => {
                    return Err(
                        self.error(format!("unexpected element <{}> in row", element_name(&e)))
                    )
                }
                Event::Eof => return Err(self.error("unclosed <row>")),
                _ => {}
            }
        }

        row_from_cells(start, cells).map_err(|err| self.error(err))
    }

    fn read_notes(&mut self) -> TableResult<Vec<TableNote>> {
        let mut notes = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"note" => {
                    let label = note_label(&e).map_err(|err| self.error(err))?;
                    let text = self.read_text(b"note")?;
                    notes.push(TableNote::new(label, Inline::parse_text(&text)));
                }
                Event::Empty(e) if e.name().as_ref() == b"note" => {
                    let label = note_label(&e).map_err(|err| self.error(err))?;
                    notes.push(TableNote::new(label, Vec::new()));
                }
                Event::End(e) if e.name().as_ref() == b"footnotes" => break,
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.error(format!(
                        "unexpected element <{}> in footnotes",
                        element_name(&e)
                    )))
                }
                Event::Eof => return Err(self.error("unclosed <footnotes>")),
                _ => {}
            }
        }

        Ok(notes)
    }

    fn read_float_row(&mut self) -> TableResult<Vec<TableDefinition>> {
        let mut tables = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"table" => tables.push(self.read_table()?),
                Event::End(e) if e.name().as_ref() == b"floatrow" => break,
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.error(format!(
                        "unexpected element <{}> in floatrow",
                        element_name(&e)
                    )))
                }
                Event::Eof => return Err(self.error("unclosed <floatrow>")),
                _ => {}
            }
        }

        if tables.is_empty() {
            return Err(self.error("floatrow contains no tables"));
        }
        Ok(tables)
    }

    /// Text content up to the closing `end` tag
    fn read_text(&mut self, end: &[u8]) -> TableResult<String> {
        let mut text = String::new();

        loop {
            match self.next()? {
                Event::Text(e) => push_text(&mut text, &e.unescape()?),
                Event::CData(e) => push_text(&mut text, &String::from_utf8_lossy(&e)),
                Event::End(e) if e.name().as_ref() == end => break,
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.error(format!(
                        "unexpected element <{}> in <{}>",
                        element_name(&e),
                        String::from_utf8_lossy(end)
                    )))
                }
                Event::Eof => {
                    return Err(self.error(format!("unclosed <{}>", String::from_utf8_lossy(end))))
                }
                _ => {}
            }
        }

        Ok(text)
    }
}

fn push_text(text: &mut String, piece: &str) {
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(piece);
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attributes(e: &BytesStart) -> TableResult<IndexMap<String, String>> {
    let mut attrs = IndexMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn apply_options(
    options: &mut TableAttributes,
    attrs: &IndexMap<String, String>,
) -> Result<(), String> {
    for (key, value) in attrs {
        match key.as_str() {
            "alignment" => options.alignment = value.clone(),
            "environment" => {
                options.environment = value
                    .parse::<Environment>()
                    .map_err(|_| format!("unknown table environment {:?}", value))?
            }
            "width" => options.widths = parse_float_list(key, value)?,
            "tabularx_width" => options.width = parse_float(key, value)?,
            "total_width" => options.total_width = Some(parse_float(key, value)?),
            "leave_table_padding" => options.leave_table_padding = parse_bool(key, value)?,
            "label" => options.label = non_empty(value),
            "caption_title" => options.caption_title = non_empty(value),
            "tablenotes_options" => options.tablenotes_options = non_empty(value),
            _ => debug!("ignoring unknown table option {}={:?}", key, value),
        }
    }
    Ok(())
}

fn push_cell(
    cells: &mut Vec<Cell>,
    text: &str,
    attrs: &IndexMap<String, String>,
) -> Result<(), String> {
    let mut cell = Cell::new(Inline::parse_text(text));
    let mut repeat = 1;

    for (key, value) in attrs {
        match key.as_str() {
            "col_span" => cell.span = parse_count(key, value)?,
            "heading" => cell.heading_level = parse_heading(value)?,
            "vertical" => cell.vertical = parse_bool(key, value)?,
            "repeat" => repeat = parse_count(key, value)?,
            _ => debug!("ignoring unknown cell attribute {}={:?}", key, value),
        }
    }

    cells.extend(std::iter::repeat(cell).take(repeat));
    Ok(())
}

fn row_from_cells(start: &BytesStart, cells: Vec<Cell>) -> Result<Row, String> {
    let attrs = attributes(start).map_err(|err| err.to_string())?;
    let mut row = Row::spanned(cells);

    for (key, value) in &attrs {
        match key.as_str() {
            "underlines" => row.underlines = parse_underlines(value)?,
            "header" => row.header = parse_bool(key, value)?,
            "top_space" => row.top_space = parse_bool(key, value)?,
            "bottom_space" => row.bottom_space = parse_bool(key, value)?,
            _ => debug!("ignoring unknown row attribute {}={:?}", key, value),
        }
    }
    Ok(row)
}

fn note_label(e: &BytesStart) -> Result<String, String> {
    let attrs = attributes(e).map_err(|err| err.to_string())?;
    attrs
        .get("label")
        .and_then(|label| non_empty(label))
        .ok_or_else(|| "note without a label".to_string())
}

fn heading_level(e: &BytesStart) -> TableResult<usize> {
    let attrs = attributes(e)?;
    match attrs.get("level") {
        Some(value) => parse_count("level", value).map_err(TableError::markup),
        None => Ok(1),
    }
}

/// `1-2,3-4`; a single number underlines one column
fn parse_underlines(value: &str) -> Result<Vec<(usize, usize)>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (start, end) = part.split_once('-').unwrap_or((part, part));
            let start = parse_count("underlines", start.trim())?;
            let end = parse_count("underlines", end.trim())?;
            Ok((start, end))
        })
        .collect()
}

fn parse_heading(value: &str) -> Result<u8, String> {
    match value.trim() {
        "" | "true" | "yes" => Ok(1),
        "false" | "no" => Ok(0),
        other => match other.parse::<u8>() {
            Ok(level) if level <= 2 => Ok(level),
            _ => Err(format!("heading must be 0, 1 or 2, got {:?}", other)),
        },
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(format!("{} must be true or false, got {:?}", key, other)),
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("{} must be a positive integer, got {:?}", key, value)),
    }
}

fn parse_float(key: &str, value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("{} must be a number, got {:?}", key, value))
}

fn parse_float_list(key: &str, value: &str) -> Result<Vec<f64>, String> {
    value.split(',').map(|w| parse_float(key, w)).collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const TABLE: &str = r#"
        <table>
          <options alignment="l,r,r" label="results" caption_title="Results"/>
          <caption>All **results** &amp; more</caption>
          <row header="true" underlines="2-3">
            <cell heading="1">Name</cell>
            <cell col_span="2" heading="1">Values</cell>
          </row>
          <row top_space="true"><cell>a</cell><cell repeat="2">1</cell></row>
          <footnotes><note label="*1">Rounded</note></footnotes>
        </table>
    "#;

    #[test]
    fn test_parse_table() {
        let table = parse_table(TABLE).unwrap();

        assert_eq!(table.attributes.alignment, "l,r,r");
        assert_eq!(table.attributes.label.as_deref(), Some("results"));
        assert_eq!(table.attributes.caption_title.as_deref(), Some("Results"));
        assert_eq!(
            table.caption,
            Inline::parse_text("All **results** & more")
        );

        assert_eq!(table.rows.len(), 2);
        let header = &table.rows[0];
        assert!(header.header);
        assert_eq!(header.underlines, vec![(2, 3)]);
        assert_eq!(header.cells.len(), 3);
        assert_eq!(header.cells[1].span, 2);
        assert_eq!(header.cells[1].heading_level, 1);
        assert!(header.cells[2].covered);

        let body = &table.rows[1];
        assert!(body.top_space);
        assert_eq!(body.cells[1], body.cells[2]);

        assert_eq!(table.notes, vec![TableNote::new("*1", Inline::parse_text("Rounded"))]);
    }

    #[test]
    fn test_column_count_mismatch() {
        let markup = "<table><row><cell>a</cell><cell>b</cell></row><row><cell>c</cell></row></table>";
        assert!(matches!(
            parse_table(markup),
            Err(TableError::StructuralMismatch {
                row: 1,
                expected: 2,
                actual: 1
            })
        ));
    }

    #[rstest]
    #[case("<table><options/><options/><row><cell/></row></table>")]
    #[case("<table><caption>a</caption><caption>b</caption><row><cell/></row></table>")]
    #[case("<table><row><cell col_span=\"0\">a</cell></row></table>")]
    #[case("<table><row><cell>a <b>b</b></cell></row></table>")]
    #[case("<table><row header=\"maybe\"><cell>a</cell></row></table>")]
    #[case("<table><footnotes><note>a</note></footnotes></table>")]
    #[case("<table><row><cell>a</cell></row>")]
    #[case("<tabel/>")]
    fn test_malformed_markup(#[case] markup: &str) {
        assert!(matches!(parse_table(markup), Err(TableError::Markup(_))));
    }

    #[test]
    fn test_options() {
        let markup = r#"<table>
            <options environment="tabularx" tabularx_width="0.9" width="0.5,0"
                     total_width="1" leave_table_padding="true" tablenotes_options="flushleft"/>
            <row><cell>a</cell><cell>b</cell></row>
        </table>"#;
        let table = parse_table(markup).unwrap();
        let attrs = &table.attributes;
        assert_eq!(attrs.environment, Environment::Tabularx);
        assert_eq!(attrs.width, 0.9);
        assert_eq!(attrs.widths, vec![0.5, 0.0]);
        assert_eq!(attrs.total_width, Some(1.0));
        assert!(attrs.leave_table_padding);
        assert_eq!(attrs.tablenotes_options.as_deref(), Some("flushleft"));
    }

    #[test]
    fn test_parse_document() {
        let markup = r#"
            <document>
              <heading level="1">Introduction</heading>
              <table><row><cell>a</cell></row></table>
              <heading level="2"/>
              <floatrow>
                <table><row><cell>b</cell></row></table>
                <table><row><cell>c</cell></row></table>
              </floatrow>
            </document>
        "#;
        let blocks = parse_document(markup).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0], Block::Heading(1));
        assert!(matches!(blocks[1], Block::Table(_)));
        assert_eq!(blocks[2], Block::Heading(2));
        assert!(matches!(blocks[3], Block::FloatRow(ref tables) if tables.len() == 2));
    }

    #[rstest]
    #[case("1-2,3-4", vec![(1, 2), (3, 4)])]
    #[case(" 2 - 3 ", vec![(2, 3)])]
    #[case("4", vec![(4, 4)])]
    #[case("", vec![])]
    fn test_parse_underlines(#[case] value: &str, #[case] expected: Vec<(usize, usize)>) {
        assert_eq!(parse_underlines(value).unwrap(), expected);
    }
}
