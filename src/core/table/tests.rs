//! Tests for the table matrix compiler and both backends

use pretty_assertions::assert_eq;

use super::*;
use crate::core::context::RenderOptions;
use crate::utils::error::TableError;

fn row(cells: &[&str]) -> Row {
    Row::new(cells.iter().map(|c| Cell::text(c)).collect())
}

fn ctx() -> RenderContext {
    RenderContext::default()
}

fn strict_ctx() -> RenderContext {
    RenderContext::new(RenderOptions::strict())
}

// ============================================================================
// LaTeX output
// ============================================================================

#[test]
fn test_simple_table() {
    let table = TableDefinition::new(vec![row(&["Name", "Value"]).header(), row(&["a", "1"])])
        .with_alignment("l,r");
    let latex = render_latex(&table, &mut ctx()).unwrap();

    assert_eq!(latex.head, "\\begin{tabular}{@{}lr@{}}\n\\toprule\n");
    assert_eq!(
        latex.rows,
        vec![
            "Name & Value \\\\ \n\\midrule \n".to_string(),
            "a & 1 \\\\ \n".to_string(),
        ]
    );
    assert_eq!(latex.tail, " \\bottomrule\n\\end{tabular}");
    assert_eq!(latex.notes, "");
    assert_eq!(latex.caption, "\\label{tab:0.1}");
}

#[test]
fn test_standalone_float() {
    let table = TableDefinition::new(vec![row(&["a"])]).with_caption("Results");
    let latex = render_latex(&table, &mut ctx()).unwrap().to_string();
    assert!(latex.starts_with("\\begin{table}\n\\caption{Results}\\label{tab:0.1}\n"));
    assert!(latex.ends_with("\\end{tabular}\n\\end{table}"));
}

#[test]
fn test_indented_paragraph_column() {
    let table = TableDefinition::new(vec![row(&["Group", "x"]), row(&["~~~ Item", "y"])])
        .with_alignment("p[0.4],l");
    let latex = render_latex(&table, &mut ctx()).unwrap();

    assert_eq!(
        latex.head,
        "\\begin{tabular}{@{}>{\\baselineskip=10pt}p{0.04\\textwidth}@{}\
         >{\\baselineskip=10pt}p{0.36\\textwidth}l@{}}\n\\toprule\n"
    );
    assert_eq!(
        latex.rows[0],
        "\\multicolumn{2}{@{}>{\\baselineskip=10pt}p{0.40\\textwidth}}{Group} & x \\\\ \n"
    );
    assert_eq!(latex.rows[1], " & Item & y \\\\ \n");
}

#[test]
fn test_multicolumn_sentinel() {
    let table = TableDefinition::new(vec![row(&["A", "B", "C"]), row(&["Wide >", "", "z"])])
        .with_alignment("l,c,r");
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert_eq!(latex.rows[1], "\\multicolumn{2}{@{}l}{Wide} & z \\\\ \n");
}

#[test]
fn test_multicolumn_at_right_edge() {
    let table = TableDefinition::new(vec![row(&["A", "B", "C"]), row(&["x", "`2,c`{=multicolumn} Both", ""])])
        .with_alignment("l,l,l");
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert_eq!(latex.rows[1], "x & \\multicolumn{2}{c@{}}{Both} \\\\ \n");
}

#[test]
fn test_multicolumn_widens_paragraph_columns() {
    let table = TableDefinition::new(vec![row(&["a", "b"]), row(&["Both >", ""])])
        .with_alignment("p[0.3],p[0.2]");
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert_eq!(
        latex.rows[1],
        "\\multicolumn{2}{@{}>{\\baselineskip=10pt}p{0.50\\textwidth}@{}}{Both} \\\\ \n"
    );
}

#[test]
fn test_force_multicolumn() {
    let table =
        TableDefinition::new(vec![row(&["a", "`fm`{=multicolumn} b"])]).with_alignment("l,r");
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert_eq!(latex.rows[0], "a & \\multicolumn{1}{r@{}}{b} \\\\ \n");
}

#[test]
fn test_leave_table_padding() {
    let mut table = TableDefinition::new(vec![row(&["a", "b", "c"]), row(&["Wide >", "", "z"])])
        .with_alignment("l,c,r");
    table.attributes.leave_table_padding = true;
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert_eq!(latex.head, "\\begin{tabular}{lcr}\n\\toprule\n");
    assert_eq!(latex.rows[1], "\\multicolumn{2}{l}{Wide} & z \\\\ \n");
}

#[test]
fn test_tabularx_environment() {
    let mut table = TableDefinition::new(vec![row(&["a"])]).with_alignment("X");
    table.attributes.environment = Environment::Tabularx;
    table.attributes.width = 0.9;
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert!(latex
        .head
        .starts_with("\\begin{tabularx}{0.90\\textwidth}{@{}>{\\baselineskip=10pt}X@{}}"));
    assert!(latex.tail.ends_with("\\end{tabularx}"));
}

#[test]
fn test_cell_content_rendering() {
    let table = TableDefinition::new(vec![
        Row::new(vec![
            Cell::text("**Total** 50%").heading(1),
            Cell::text("`\\alpha`{=latex}").vertical(),
        ]),
    ]);
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert_eq!(
        latex.rows[0],
        "\\sffamily \\textbf{Total} 50\\% & \\rotatebox{90}{\\alpha} \\\\ \n"
    );
}

#[test]
fn test_row_spacing_struts() {
    let mut spaced = row(&["a", "b"]);
    spaced.top_space = true;
    spaced.bottom_space = true;
    let table = TableDefinition::new(vec![spaced]);
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert_eq!(
        latex.rows[0],
        "a\\rule{0pt}{2.6ex}\\rule[-1.2ex]{0pt}{0pt} & b \\\\ \n"
    );
}

// ============================================================================
// Rules
// ============================================================================

#[test]
fn test_row_underlines() {
    let table = TableDefinition::new(vec![
        row(&["a", "b", "c", "d"]).with_underlines(vec![(1, 4)]),
        row(&["e", "f", "g", "h"]).with_underlines(vec![(2, 3)]),
        row(&["i", "j", "k", "l"]).with_underlines(vec![(1, 2), (4, 4)]),
    ]);
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert!(latex.rows[0].ends_with("\\\\ \n\\midrule \n"));
    assert!(latex.rows[1].ends_with("\\\\ \n\\cmidrule(lr){2-3} \n"));
    assert!(latex.rows[2].ends_with("\\\\ \n\\cmidrule(r){1-2} \\cmidrule(l){4-4} \n"));
}

#[test]
fn test_cell_underline_sentinels() {
    let table = TableDefinition::new(vec![
        row(&["a", "b _", "c", "d"]),
        row(&["e", "f 2_", "g", "h"]),
        row(&["i", "j", "k", "l 3_"]),
        row(&["`mr`{=multicolumn} m", "n", "o", "p"]),
    ]);
    let layout = compile_table(&table, &mut ctx()).unwrap();
    assert_eq!(layout.rows[0].rules, vec![Rule::over(2, 2, 4)]);
    assert_eq!(layout.rows[1].rules, vec![Rule::over(2, 3, 4)]);
    // clamped to the table edge
    assert_eq!(layout.rows[2].rules, vec![Rule::over(4, 4, 4)]);
    assert_eq!(layout.rows[3].rules, vec![Rule::Full]);
    assert_eq!(layout.rows[1].underlined, vec![false, true, true, false]);
    assert_eq!(layout.rows[3].underlined, vec![true; 4]);
}

#[test]
fn test_rules_use_physical_columns() {
    let table = TableDefinition::new(vec![
        row(&["a", "b"]).with_underlines(vec![(2, 2)]),
        row(&["~~~ c", "d _"]),
    ])
    .with_alignment("l,l");
    let layout = compile_table(&table, &mut ctx()).unwrap();
    assert_eq!(layout.physical_column_count(), 3);
    assert_eq!(layout.rows[0].rules, vec![Rule::over(3, 3, 3)]);
    assert_eq!(layout.rows[1].rules, vec![Rule::over(3, 3, 3)]);
}

#[test]
fn test_invalid_row_underline() {
    let table = TableDefinition::new(vec![row(&["a", "b"]).with_underlines(vec![(2, 3)])]);
    assert!(matches!(
        compile_table(&table, &mut ctx()),
        Err(TableError::InvalidRule {
            row: 0,
            start: 2,
            end: 3,
            columns: 2
        })
    ));
}

#[test]
fn test_header_gets_midrule_once() {
    let table = TableDefinition::new(vec![
        row(&["A", "B"]).header(),
        row(&["a", "b"]).header(),
        row(&["1", "2"]),
    ]);
    let layout = compile_table(&table, &mut ctx()).unwrap();
    assert!(layout.rows[0].rules.is_empty());
    assert_eq!(layout.rows[1].rules, vec![Rule::Full]);
    assert!(layout.rows[2].rules.is_empty());
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_compiled_rows_cover_every_column() {
    let table = TableDefinition::new(vec![
        row(&["a", "b", "c", "d"]),
        Row::spanned(vec![Cell::text("x").with_span(2), Cell::text("y >"), Cell::text("")]),
        row(&["~~~ e", "f 2>", "", ""]),
    ]);
    let layout = compile_table(&table, &mut ctx()).unwrap();
    for row in &layout.rows {
        let spans: usize = row.cells.iter().map(|c| c.span).sum();
        assert_eq!(spans, layout.column_count());
    }
}

#[test]
fn test_span_mismatch_names_row() {
    let table = TableDefinition::new(vec![
        row(&["a", "b", "c", "d"]),
        Row::spanned(vec![
            Cell::text("x").with_span(3),
            Cell::text("y"),
            Cell::text("z"),
        ]),
    ]);
    let err = compile_table(&table, &mut ctx()).unwrap_err();
    assert!(matches!(
        err,
        TableError::StructuralMismatch {
            row: 1,
            expected: 4,
            ..
        }
    ));
}

#[test]
fn test_sentinel_span_past_table_edge() {
    let table = TableDefinition::new(vec![row(&["a", "b"]), row(&["c", "d >"])]);
    assert!(matches!(
        compile_table(&table, &mut ctx()),
        Err(TableError::StructuralMismatch {
            row: 1,
            expected: 2,
            actual: 3
        })
    ));
}

#[test]
fn test_failed_table_still_counts() {
    let mut ctx = ctx();
    let bad = TableDefinition::new(vec![row(&["a", "b"]), row(&["c"])]);
    assert!(compile_table(&bad, &mut ctx).is_err());

    let good = TableDefinition::new(vec![row(&["a"])]);
    assert_eq!(compile_table(&good, &mut ctx).unwrap().number, "0.2");
}

// ============================================================================
// Columns and widths
// ============================================================================

#[test]
fn test_invalid_column_degrades_with_warning() {
    let table = TableDefinition::new(vec![row(&["a", "b"])]).with_alignment("l,q");
    let mut ctx = ctx();
    let layout = compile_table(&table, &mut ctx).unwrap();
    let ids: Vec<char> = layout.columns.iter().map(|c| c.identifier()).collect();
    assert_eq!(ids, vec!['l', 'l']);
    assert!(!ctx.warnings().is_empty());

    assert!(compile_table(&table, &mut strict_ctx()).is_err());
}

#[test]
fn test_missing_width_is_fatal_even_when_lenient() {
    let table = TableDefinition::new(vec![row(&["a"])]).with_alignment("p");
    assert!(matches!(
        compile_table(&table, &mut ctx()),
        Err(TableError::MissingRequiredOption { .. })
    ));
}

#[test]
fn test_unresolved_span_override() {
    let alignment = "p[0.4,multicolumn_definitions=[l,c]],l";
    let table = TableDefinition::new(vec![row(&["~~~ a >", "b"]), row(&["~~~ ~~~ c", "d"])])
        .with_alignment(alignment);
    let layout = compile_table(&table, &mut ctx()).unwrap();
    let anchor = layout.rows[0].cells[0].multicolumn.as_ref().map(|c| c.identifier());
    assert_eq!(anchor, Some('c'));

    let table = TableDefinition::new(vec![row(&["~~~ ~~~ a >", "b"]), row(&["~~~ ~~~ c", "d"])])
        .with_alignment(alignment);
    assert!(matches!(
        compile_table(&table, &mut ctx()),
        Err(TableError::UnresolvedSpanOverride {
            span: 2,
            available: 2
        })
    ));
}

#[test]
fn test_widths_from_specifiers() {
    let table = TableDefinition::new(vec![row(&["a", "b", "c"])]).with_alignment("p[0.4],l,l");
    let layout = compile_table(&table, &mut ctx()).unwrap();
    let expected = [0.32, 0.24, 0.24];
    for (w, e) in layout.widths.iter().zip(expected) {
        assert!((w - e).abs() < 1e-9, "{:?}", layout.widths);
    }
}

#[test]
fn test_indented_cell_width_excludes_indentation() {
    let table = TableDefinition::new(vec![row(&["Group", "x"]), row(&["~~~ Item", "y"])])
        .with_alignment("p[0.4],l");
    let layout = compile_table(&table, &mut ctx()).unwrap();
    let first = |r: usize| {
        layout.rows[r]
            .cells
            .iter()
            .find(|c| c.column == 0)
            .map(|c| c.width)
            .unwrap()
    };

    assert!((first(0) - 0.32).abs() < 1e-9, "{}", first(0));
    assert!((first(1) - 0.288).abs() < 1e-9, "{}", first(1));
    assert!(first(1) < first(0));
}

#[test]
fn test_explicit_widths_build_paragraph_columns() {
    let mut table = TableDefinition::new(vec![row(&["a", "b"])]);
    table.attributes.widths = vec![0.5, 0.0];
    table.attributes.total_width = Some(1.0);
    let layout = compile_table(&table, &mut ctx()).unwrap();
    assert_eq!(layout.widths, vec![0.5, 0.5]);

    let latex = latex::render_table(&layout, &ctx());
    assert!(latex.head.contains("p{0.50\\textwidth}>{\\baselineskip=10pt}p{0.50\\textwidth}"));
}

#[test]
fn test_explicit_widths_over_budget() {
    let mut table = TableDefinition::new(vec![row(&["a", "b"])]);
    table.attributes.widths = vec![0.7, 0.6];
    assert!(matches!(
        compile_table(&table, &mut ctx()),
        Err(TableError::InvalidWidth { .. })
    ));
}

#[test]
fn test_resolve_widths_conserves_total() {
    for raw in [vec![0.0, 0.0, 0.0], vec![0.2, 0.0, 0.3], vec![0.5, 0.5], vec![0.6, 0.6, 0.0]] {
        let widths = resolve_widths(&raw, 0.8, false).unwrap();
        let sum: f64 = widths.iter().sum();
        assert!((sum - 0.8).abs() < 1e-6, "{:?} -> {:?}", raw, widths);
        assert!(widths.iter().all(|w| (0.0..=1.0).contains(w)));
    }
    assert!(resolve_widths(&[-0.1, 0.0], 0.8, false).is_err());
}

// ============================================================================
// Numbering, labels and notes
// ============================================================================

#[test]
fn test_numbering_within_headings() {
    let mut ctx = ctx();
    ctx.enter_heading(1);
    let table = TableDefinition::new(vec![row(&["a"])]);
    assert_eq!(compile_table(&table, &mut ctx).unwrap().label, "tab:1.1");
    assert_eq!(compile_table(&table, &mut ctx).unwrap().label, "tab:1.2");
    ctx.enter_heading(1);
    assert_eq!(compile_table(&table, &mut ctx).unwrap().label, "tab:2.1");
}

#[test]
fn test_named_table_caption() {
    let mut table = TableDefinition::new(vec![row(&["a"])]).with_caption("All results");
    table.attributes.label = Some("results".into());
    table.attributes.caption_title = Some("Results".into());

    let mut ctx = ctx();
    let latex = render_latex(&table, &mut ctx).unwrap();
    assert_eq!(
        latex.caption,
        "\\caption[Results]{All results}\\label{tab:results}"
    );
    assert!(ctx.labels().has_label("results"));
}

#[test]
fn test_table_notes() {
    let table = TableDefinition::new(vec![row(&["x", "12.5[^*1]_"])])
        .with_notes(vec![TableNote::new("*1", Inline::parse_text("Significant"))]);
    let mut ctx = ctx();
    let latex = render_latex(&table, &mut ctx).unwrap();

    assert!(latex.head.starts_with("\\begin{threeparttable}\n\\begin{tabular}"));
    assert_eq!(latex.rows[0], "x & 12.5\\tnotex{tn:0.1:asterisk} \\\\ \n");
    assert_eq!(
        latex.notes,
        "\n\\vspace{.5\\skip\\footins}\n\\begin{tablenotes}\n\
         \\item[*] \\label{tn:0.1:asterisk} Significant\n\
         \\end{tablenotes}\n\\end{threeparttable}"
    );
    assert!(ctx.labels().has_target("tn:0.1:asterisk"));
}

#[test]
fn test_tablenotes_options() {
    let mut table = TableDefinition::new(vec![row(&["a"])])
        .with_notes(vec![TableNote::new("a", Inline::parse_text("note"))]);
    table.attributes.tablenotes_options = Some("flushleft".into());
    let latex = render_latex(&table, &mut ctx()).unwrap();
    assert!(latex.notes.contains("\\begin{tablenotes}[flushleft]\n"));
}

// ============================================================================
// ODT output
// ============================================================================

#[test]
fn test_odt_table_structure() {
    let table = TableDefinition::new(vec![
        Row::new(vec![Cell::text("A").heading(1), Cell::text("B").heading(1)]).header(),
        Row::spanned(vec![Cell::text("Both").with_span(2)]),
    ])
    .with_caption("Results");
    let mut ctx = ctx();
    let xml = render_odt(&table, &mut ctx).unwrap();

    assert!(xml.starts_with(
        "<text:p text:style-name=\"Table\"><text:span text:style-name=\"Strong_20_Emphasis\">Table \
         <text:sequence text:ref-name=\"refTable0_1\" text:name=\"Table\" \
         text:formula=\"ooow:Table+1\" style:num-format=\"1\">0.1</text:sequence>: \
         </text:span>Results</text:p>"
    ));
    assert!(xml.contains(
        "<table:table table:name=\"Table0_1\" table:style-name=\"Table0_1\" \
         table:template-name=\"Default Style\">"
    ));
    assert!(xml.contains("<table:table-column table:style-name=\"Table0_1.B\"/>"));
    assert!(xml.contains(
        "<table:table-cell table:style-name=\"Table0_1.A2\" office:value-type=\"string\" \
         table:number-columns-spanned=\"2\"><text:p text:style-name=\"Table_20_Contents\">Both</text:p>\
         </table:table-cell><table:covered-table-cell/></table:table-row>"
    ));
    assert!(xml.contains("<text:p text:style-name=\"Table_20_Heading\">A</text:p>"));

    let styles = ctx.auto_styles().join("\n");
    assert!(styles.contains("style:rel-column-width=\"400*\""));
    assert!(styles.contains("style:name=\"Table0_1.B1\""));
    assert!(!styles.contains("style:name=\"Table0_1.B2\""));
}

#[test]
fn test_odt_cell_styles() {
    let mut spaced = row(&["~~~ c", "d"]);
    spaced.top_space = true;
    let table = TableDefinition::new(vec![
        row(&["a", "b"]).with_underlines(vec![(2, 2)]),
        spaced,
    ]);
    let mut ctx = ctx();
    render_odt(&table, &mut ctx).unwrap();
    let styles = ctx.take_auto_styles().join("\n");

    assert!(styles.contains(
        "<style:style style:name=\"Table0_1.B1\" style:family=\"table-cell\">\
         <style:table-cell-properties fo:padding-left=\"0.10cm\" fo:padding-right=\"0.10cm\" \
         fo:padding-top=\"0.10cm\" fo:padding-bottom=\"0.10cm\" style:vertical-align=\"bottom\" \
         fo:border-bottom=\"0.5pt solid #000000\"/></style:style>"
    ));
    assert!(styles.contains(
        "<style:style style:name=\"Table0_1.A2\" style:family=\"table-cell\">\
         <style:table-cell-properties fo:padding-left=\"0.35cm\" fo:padding-right=\"0.10cm\" \
         fo:padding-top=\"0.15cm\" fo:padding-bottom=\"0.10cm\" style:vertical-align=\"bottom\"/>\
         </style:style>"
    ));
}

#[test]
fn test_odt_notes_and_escaping() {
    let table = TableDefinition::new(vec![row(&["a<b", "1[^*2]_"])])
        .with_notes(vec![TableNote::new("*2", Inline::parse_text("Dagger note"))]);
    let xml = render_odt(&table, &mut ctx()).unwrap();
    assert!(xml.contains("a&lt;b"));
    assert!(xml.contains("1<text:span text:style-name=\"Superscript\">†</text:span>"));
    assert!(xml.ends_with(
        "<text:p text:style-name=\"Table_20_Legend\"><text:span text:style-name=\"Superscript\">†\
         </text:span> Dagger note</text:p>"
    ));
}
