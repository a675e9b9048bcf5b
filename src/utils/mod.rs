//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Numeric helpers for lengths and style names

pub mod error;
pub mod units;

// Re-export commonly used items
pub use error::{RenderWarning, TableError, TableResult};
pub use units::{format_decimal, number_to_uppercase, string_to_float_unit};
