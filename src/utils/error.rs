//! Error handling for table rendering
//!
//! This module provides the error taxonomy shared by the column-specification
//! parser, the table matrix model and both output backends.

use std::fmt;
use thiserror::Error;

/// Table rendering error type
#[derive(Error, Debug)]
pub enum TableError {
    /// Malformed DSL text, unknown column identifier or unexpected option
    #[error("{}", format_definition(.message, .position))]
    Definition {
        message: String,
        position: Option<usize>,
    },

    /// A column kind's required option was not supplied
    #[error("'{option}' is a required option of '{identifier}' and wasn't given")]
    MissingRequiredOption { identifier: String, option: String },

    /// Row column counts disagree after span accounting
    #[error("row {row}: expected {expected} columns but got {actual}")]
    StructuralMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// An indexed multicolumn override has no entry for the requested span
    #[error("no multicolumn definition for index {span} (only {available} defined)")]
    UnresolvedSpanOverride { span: usize, available: usize },

    /// A width could not be interpreted
    #[error("invalid width {value:?}: {reason}")]
    InvalidWidth { value: String, reason: String },

    /// A row-level underline range lies outside the table
    #[error("row {row}: underline {start}-{end} is outside of 1-{columns}")]
    InvalidRule {
        row: usize,
        start: usize,
        end: usize,
        columns: usize,
    },

    /// Malformed table markup
    #[error("table markup error: {0}")]
    Markup(String),

    /// XML reading or writing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_definition(message: &str, position: &Option<usize>) -> String {
    match position {
        Some(p) => format!("definition error at offset {}: {}", p, message),
        None => format!("definition error: {}", message),
    }
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

// Convenience constructors for errors
impl TableError {
    pub fn definition(message: impl Into<String>) -> Self {
        TableError::Definition {
            message: message.into(),
            position: None,
        }
    }

    pub fn definition_at(message: impl Into<String>, position: usize) -> Self {
        TableError::Definition {
            message: message.into(),
            position: Some(position),
        }
    }

    pub fn missing_option(identifier: impl Into<String>, option: impl Into<String>) -> Self {
        TableError::MissingRequiredOption {
            identifier: identifier.into(),
            option: option.into(),
        }
    }

    pub fn invalid_width(value: impl Into<String>, reason: impl Into<String>) -> Self {
        TableError::InvalidWidth {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn markup(message: impl Into<String>) -> Self {
        TableError::Markup(message.into())
    }

    /// Whether the `ignore_errors` policy may downgrade this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TableError::Definition { .. } | TableError::InvalidWidth { .. }
        )
    }
}

/// Non-fatal issue encountered while rendering
#[derive(Debug, Clone, PartialEq)]
pub struct RenderWarning {
    pub message: String,
    pub suggestion: Option<String>,
}

impl RenderWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning: {}", self.message)?;
        if let Some(ref sug) = self.suggestion {
            write!(f, " ({})", sug)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_error_display() {
        let err = TableError::definition("unknown column identifier 'q'");
        assert!(err.to_string().contains("definition error"));
        assert!(err.to_string().contains("'q'"));
    }

    #[test]
    fn test_definition_error_with_position() {
        let err = TableError::definition_at("expected ']'", 7);
        assert!(err.to_string().contains("offset 7"));
    }

    #[test]
    fn test_structural_mismatch_names_row() {
        let err = TableError::StructuralMismatch {
            row: 1,
            expected: 4,
            actual: 6,
        };
        let msg = err.to_string();
        assert!(msg.contains("row 1"));
        assert!(msg.contains("expected 4"));
        assert!(msg.contains("got 6"));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(TableError::definition("x").is_recoverable());
        assert!(TableError::invalid_width("abc", "not a number").is_recoverable());
        assert!(!TableError::missing_option("p", "width").is_recoverable());
        assert!(!TableError::UnresolvedSpanOverride {
            span: 3,
            available: 2
        }
        .is_recoverable());
    }

    #[test]
    fn test_warning_display() {
        let warning = RenderWarning::with_suggestion("column 'q' replaced", "use l, r or c");
        assert_eq!(
            warning.to_string(),
            "Warning: column 'q' replaced (use l, r or c)"
        );
    }
}
