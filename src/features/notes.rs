//! Table note labels
//!
//! Note labels of the form `*N` stand for the N-th symbol of the configured
//! symbol set. Labels are turned into reference-safe names by spelling out
//! every character that is not alphanumeric.

use lazy_static::lazy_static;
use regex::Regex;

use crate::data::{NoteSymbolStyle, SYMBOL_NAMES};

lazy_static! {
    static ref NUM_LABEL: Regex = Regex::new(r"^\*(?P<number>[0-9]+)$").unwrap();
}

/// The term shown for a note label: `*2` becomes the second symbol
///
/// Numbers beyond the symbol set fall back to the number itself.
pub fn note_term(label: &str, style: NoteSymbolStyle) -> String {
    let label = label.trim();
    let Some(caps) = NUM_LABEL.captures(label) else {
        return label.to_string();
    };

    let number = &caps["number"];
    number
        .parse::<usize>()
        .ok()
        .and_then(|n| style.symbol(n))
        .map(str::to_string)
        .unwrap_or_else(|| number.to_string())
}

/// Spell out non-alphanumeric characters, `†` becomes `dagger`
pub fn format_label(label: &str) -> String {
    let label = label.trim();
    if label.chars().all(char::is_alphanumeric) {
        return label.to_string();
    }

    let mut out = String::with_capacity(label.len() * 4);
    for ch in label.chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else {
            match SYMBOL_NAMES.get(&ch) {
                Some(name) => out.push_str(name),
                None => out.push_str(&format!("u{:04x}", ch as u32)),
            }
        }
    }
    out
}

/// Reference-safe target for a note label
pub fn note_target(label: &str, style: NoteSymbolStyle) -> String {
    format_label(&note_term(label, style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("*1", NoteSymbolStyle::Lion, "*")]
    #[case("*5", NoteSymbolStyle::Lion, "◊")]
    #[case("*5", NoteSymbolStyle::Chicago, "‖")]
    #[case("*2", NoteSymbolStyle::Wiley, "**")]
    #[case("*9", NoteSymbolStyle::Lion, "9")]
    #[case(" a ", NoteSymbolStyle::Lion, "a")]
    #[case("*x", NoteSymbolStyle::Lion, "*x")]
    fn test_note_term(#[case] label: &str, #[case] style: NoteSymbolStyle, #[case] term: &str) {
        assert_eq!(note_term(label, style), term);
    }

    #[rstest]
    #[case("a1", "a1")]
    #[case("*", "asterisk")]
    #[case("†", "dagger")]
    #[case("\\#", "reverse-solidusnumber-sign")]
    #[case("a-b", "ahyphen-minusb")]
    #[case("€", "u20ac")]
    fn test_format_label(#[case] label: &str, #[case] formatted: &str) {
        assert_eq!(format_label(label), formatted);
    }

    #[test]
    fn test_note_target() {
        assert_eq!(note_target("*2", NoteSymbolStyle::Lion), "dagger");
        assert_eq!(note_target("b", NoteSymbolStyle::Lion), "b");
    }
}
