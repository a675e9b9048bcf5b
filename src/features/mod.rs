//! Feature modules - document-level table features
//!
//! This module contains the handlers around the table compiler:
//! - Scope counters and the label registry
//! - Table note labels
//! - The XML table markup reader
//! - Float rows of side-by-side tables

pub mod floats;
pub mod markup;
pub mod notes;
pub mod refs;

// Re-export commonly used types
pub use floats::{float_row, render_float_row};
pub use markup::{parse_document, parse_table, Block};
pub use notes::{format_label, note_target, note_term};
pub use refs::{Label, LabelRegistry, LabelType, ScopeCounters};
