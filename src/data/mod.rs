//! Data layer - Static mappings and constants
//!
//! This module contains all static data used for table rendering:
//! - Table note symbol sets and label-safe symbol names
//! - Alignment name mappings
//! - OpenDocument style names

pub mod constants;

// Re-export commonly used items
pub use constants::{
    latex_heading_prefix, odt_paragraph_style, NoteSymbolStyle, ALIGNMENT_IDENTIFIERS,
    SYMBOL_NAMES,
};
