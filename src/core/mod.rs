//! Core table engines
//!
//! This module contains the main rendering engines:
//! - `colspec`: column specification DSL and the column specifier model
//! - `context`: render options and per-document state
//! - `table`: table matrix compiler with the LaTeX and ODT backends

pub mod colspec;
pub mod context;
pub mod table;

// Re-export main types and functions from colspec
pub use colspec::{
    parse_column_definitions, parse_column_specifiers, parse_options, resolve_columns,
    ColumnKind, ColumnSpecifier, OptionSchema, OptionValue,
};

// Re-export the render state
pub use context::{RenderContext, RenderOptions};

// Re-export main types and functions from table
pub use table::{
    compile_table, render_latex, render_odt, Cell, LatexTable, Row, TableAttributes,
    TableDefinition, TableLayout, TableNote,
};
