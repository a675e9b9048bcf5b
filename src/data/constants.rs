//! Constants and mapping tables for table rendering
//!
//! - Table note symbol sets
//! - Spelled-out names for label-unsafe characters
//! - Alignment names accepted in place of a column identifier
//! - OpenDocument style names

use phf::phf_map;

// ============================================================================
// Table note symbols
// ============================================================================

/// Symbol sequence used for numbered table notes (`*1`, `*2`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NoteSymbolStyle {
    Chicago,
    #[default]
    Lion,
    Bringhurst,
    Wiley,
}

impl NoteSymbolStyle {
    pub fn symbols(&self) -> &'static [&'static str] {
        match self {
            NoteSymbolStyle::Chicago => &["*", "†", "‡", "§", "‖", "\\#"],
            NoteSymbolStyle::Lion => &["*", "†", "‡", "§", "◊", "\\#"],
            NoteSymbolStyle::Bringhurst => &["*", "†", "‡", "§", "‖", "¶"],
            NoteSymbolStyle::Wiley => &["*", "**", "†", "‡", "§", "‖", "¶"],
        }
    }

    /// Symbol for the 1-based note number, if the set is long enough
    pub fn symbol(&self, number: usize) -> Option<&'static str> {
        number
            .checked_sub(1)
            .and_then(|i| self.symbols().get(i).copied())
    }
}

/// Names used to spell out characters that cannot appear in a LaTeX label
pub static SYMBOL_NAMES: phf::Map<char, &'static str> = phf_map! {
    '*' => "asterisk",
    '†' => "dagger",
    '‡' => "double-dagger",
    '§' => "section-sign",
    '‖' => "double-vertical-line",
    '¶' => "pilcrow-sign",
    '◊' => "lozenge",
    '#' => "number-sign",
    '\\' => "reverse-solidus",
    '-' => "hyphen-minus",
    '+' => "plus-sign",
    '.' => "full-stop",
    ':' => "colon",
    '_' => "low-line",
    ' ' => "space",
};

// ============================================================================
// Alignments
// ============================================================================

/// Alignment names mapped onto simple column identifiers
pub static ALIGNMENT_IDENTIFIERS: phf::Map<&'static str, &'static str> = phf_map! {
    "AlignLeft" => "l",
    "AlignDefault" => "l",
    "AlignRight" => "r",
    "AlignCenter" => "c",
    "left" => "l",
    "right" => "r",
    "center" => "c",
};

// ============================================================================
// OpenDocument style names
// ============================================================================

pub const ODT_HEADING_STYLE: &str = "Table_20_Heading";
pub const ODT_SUBHEADING_STYLE: &str = "Table_20_Subheading";
pub const ODT_CONTENTS_STYLE: &str = "Table_20_Contents";
pub const ODT_LEGEND_STYLE: &str = "Table_20_Legend";
pub const ODT_STRONG_STYLE: &str = "Strong_20_Emphasis";
pub const ODT_SUPERSCRIPT_STYLE: &str = "Superscript";
pub const ODT_VERTICAL_STYLE: &str = "Vertical";
pub const ODT_CAPTION_STYLE: &str = "Table";

/// Paragraph style for a cell with the given heading level
pub fn odt_paragraph_style(heading_level: u8) -> &'static str {
    match heading_level {
        1 => ODT_HEADING_STYLE,
        2 => ODT_SUBHEADING_STYLE,
        _ => ODT_CONTENTS_STYLE,
    }
}

/// LaTeX font switch prefixed to a cell with the given heading level
pub fn latex_heading_prefix(heading_level: u8) -> &'static str {
    match heading_level {
        1 => "\\sffamily ",
        2 => "\\sffamily\\small ",
        _ => "",
    }
}
