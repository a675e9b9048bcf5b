//! Render options and per-document render state
//!
//! [`RenderOptions`] configures rendering; [`RenderContext`] carries the
//! mutable per-document state (counters, labels, ODT automatic styles,
//! warnings) explicitly through every table render.

use log::warn;

use crate::data::NoteSymbolStyle;
use crate::features::refs::{dotted, LabelRegistry, LabelType, ScopeCounters};
use crate::utils::error::{RenderWarning, TableError, TableResult};

// =============================================================================
// Render options
// =============================================================================

/// Options for table rendering
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// Replace invalid column definitions with plain `l` columns instead of
    /// failing the table
    /// Default: true
    pub ignore_errors: bool,

    /// Fraction of the text width a table occupies unless the table says otherwise
    /// Default: 0.8
    pub total_width: f64,

    /// Heading level tables are numbered within (`0` numbers consecutively)
    /// Default: 1
    pub number_within: usize,

    /// Symbols used for `*N` table note labels
    /// Default: Lion
    pub note_symbols: NoteSymbolStyle,

    /// Outline level of the ODT table sequence
    /// Default: 1
    pub outline_level: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            ignore_errors: true,
            total_width: 0.8,
            number_within: 1,
            note_symbols: NoteSymbolStyle::default(),
            outline_level: 1,
        }
    }
}

impl RenderOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict mode options (errors on invalid column definitions)
    pub fn strict() -> Self {
        Self {
            ignore_errors: false,
            ..Self::default()
        }
    }

    /// Create lenient options: invalid definitions degrade, tables fill the text width
    pub fn lenient() -> Self {
        Self {
            ignore_errors: true,
            total_width: 1.0,
            ..Self::default()
        }
    }

    /// Check option values that would make every table fail
    pub fn validate(&self) -> TableResult<()> {
        if !(self.total_width > 0.0 && self.total_width.is_finite()) {
            return Err(TableError::invalid_width(
                self.total_width.to_string(),
                "total width must be a positive number",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Render context
// =============================================================================

/// Per-document render state, threaded through every table render
///
/// Tables must be rendered exactly once and in document order: every render
/// increments the table counter.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub options: RenderOptions,
    counters: ScopeCounters,
    labels: LabelRegistry,
    auto_styles: Vec<String>,
    warnings: Vec<RenderWarning>,
}

impl RenderContext {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Record a heading; table numbers are relative to headings
    pub fn enter_heading(&mut self, level: usize) {
        self.counters.enter_heading(level);
    }

    /// Count a table and return its dotted number
    pub fn next_table_number(&mut self) -> String {
        let number = self.counters.next_table(self.options.number_within);
        dotted(&number)
    }

    pub fn counters(&self) -> &ScopeCounters {
        &self.counters
    }

    /// Register a table name and return its reference label (`tab:<name>`)
    pub fn register_table(&mut self, name: &str) -> String {
        let target = format!("tab:{}", name);
        self.labels
            .register_label(name, &target, LabelType::Table)
            .target
            .clone()
    }

    /// Register a table note label under its table's note prefix
    pub fn register_note(&mut self, prefix: &str, label: &str) -> String {
        let target = format!("{}:{}", prefix, label);
        self.labels
            .register_label(&target, &target, LabelType::TableNote)
            .target
            .clone()
    }

    /// Record a link target such as a note prefix and return it
    pub fn make_target(&mut self, target: &str) -> String {
        self.labels.make_target(target)
    }

    pub fn labels(&self) -> &LabelRegistry {
        &self.labels
    }

    /// Add an ODT automatic style declaration
    pub fn push_auto_style(&mut self, style: String) {
        self.auto_styles.push(style);
    }

    pub fn auto_styles(&self) -> &[String] {
        &self.auto_styles
    }

    pub fn take_auto_styles(&mut self) -> Vec<String> {
        std::mem::take(&mut self.auto_styles)
    }

    /// Record a non-fatal issue
    pub fn warn(&mut self, warning: RenderWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Record warnings that were already logged where they arose
    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = RenderWarning>) {
        self.warnings.extend(warnings);
    }

    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<RenderWarning> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert!(options.ignore_errors);
        assert_eq!(options.total_width, 0.8);
        assert_eq!(options.number_within, 1);
        assert_eq!(options.note_symbols, NoteSymbolStyle::Lion);
        assert!(!RenderOptions::strict().ignore_errors);
        assert_eq!(RenderOptions::lenient().total_width, 1.0);
    }

    #[test]
    fn test_validate_total_width() {
        assert!(RenderOptions::default().validate().is_ok());
        let options = RenderOptions {
            total_width: 0.0,
            ..RenderOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_table_numbers_and_labels() {
        let mut ctx = RenderContext::default();
        ctx.enter_heading(1);
        assert_eq!(ctx.next_table_number(), "1.1");
        assert_eq!(ctx.register_table("1.1"), "tab:1.1");
        assert!(ctx.labels().has_label("1.1"));

        assert_eq!(ctx.register_note("tn:1.1", "a"), "tn:1.1:a");
        assert!(ctx.labels().has_target("tn:1.1:a"));
    }

    #[test]
    fn test_warnings_are_collected() {
        let mut ctx = RenderContext::default();
        ctx.warn(RenderWarning::new("column replaced"));
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.take_warnings().len(), 1);
        assert!(ctx.warnings().is_empty());
    }
}
