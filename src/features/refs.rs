//! Counter and Cross-Reference Module
//!
//! Scope counters number tables relative to their enclosing heading
//! ("table 2.3" is the third table below the second level-1 heading), and the
//! label registry records which names resolve to which link targets.

use fxhash::FxHashMap;
use indexmap::{IndexMap, IndexSet};
use log::debug;

/// Register used for heading numbers
pub const HEADING_REGISTER: &str = "heading";
/// Register used for table numbers
pub const TABLE_REGISTER: &str = "table";

// ============================================================================
// Scope counters
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
struct Counter {
    /// Value of the scope the counts below belong to
    scope: Vec<u32>,
    /// Count per level, level 1 first
    levels: Vec<u32>,
}

/// Monotonic per-register counters that reset when their scope changes
///
/// Mutated in place by every counted element: count each element exactly once,
/// in document order.
#[derive(Debug, Clone, Default)]
pub struct ScopeCounters {
    registers: FxHashMap<String, Counter>,
}

impl ScopeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one element of `register` at `level` (1-based)
    ///
    /// With `relative_to = Some((scope_register, scope_level))` the counter is
    /// restarted whenever the current value of the scope register (truncated to
    /// `scope_level` levels) differs from the one seen at the previous count.
    pub fn count(&mut self, register: &str, level: usize, relative_to: Option<(&str, usize)>) {
        let index = level.max(1);
        let scope = relative_to.map(|(key, scope_level)| self.current(key, scope_level));

        let counter = self.registers.entry(register.to_string()).or_default();

        if let Some(scope) = scope {
            if counter.scope != scope {
                counter.scope = scope;
                counter.levels = vec![1; index - 1];
                counter.levels.push(0);
            }
        }

        if counter.levels.len() < index {
            counter.levels.resize(index, 1);
        } else {
            counter.levels[index - 1] += 1;
        }
        counter.levels.truncate(index);
    }

    /// Current dotted value of `register` with `level` levels, scope first
    ///
    /// A register that has never been counted reads as zeros; missing levels
    /// read as 1.
    pub fn current(&self, register: &str, level: usize) -> Vec<u32> {
        match self.registers.get(register) {
            None => vec![0; level],
            Some(counter) => {
                let mut value = counter.scope.clone();
                value.extend(counter.levels.iter().take(level));
                let missing = level.saturating_sub(counter.levels.len());
                value.extend(std::iter::repeat(1).take(missing));
                value
            }
        }
    }

    /// Record a heading of the given level
    pub fn enter_heading(&mut self, level: usize) {
        self.count(HEADING_REGISTER, level, None);
    }

    /// Count a table and return its number, relative to headings of level
    /// `number_within` (0 numbers tables consecutively)
    pub fn next_table(&mut self, number_within: usize) -> Vec<u32> {
        let scope = (number_within > 0).then_some((HEADING_REGISTER, number_within));
        self.count(TABLE_REGISTER, 1, scope);
        self.current(TABLE_REGISTER, 1)
    }
}

/// Format a counter value as `2.3`
pub fn dotted(value: &[u32]) -> String {
    value
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

// ============================================================================
// Labels
// ============================================================================

/// Type of labeled element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelType {
    /// Table
    Table,
    /// Table note
    TableNote,
}

/// A label for cross-referencing
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Name the label is registered under (table name or note label)
    pub name: String,
    /// Link target, e.g. `tab:2.3`
    pub target: String,
    /// Type of labeled element
    pub label_type: LabelType,
}

/// Registry of named labels and of all emitted link targets
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    labels: IndexMap<String, Label>,
    link_targets: IndexSet<String>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label, overwriting an earlier one with the same name
    pub fn register_label(&mut self, name: &str, target: &str, label_type: LabelType) -> &Label {
        if let Some(previous) = self.labels.get(name) {
            debug!(
                "{} is already a defined label (-> {}), overwriting it now",
                name, previous.target
            );
        }

        self.make_target(target);
        let label = Label {
            name: name.to_string(),
            target: target.to_string(),
            label_type,
        };
        let (index, _) = self.labels.insert_full(name.to_string(), label);
        &self.labels[index]
    }

    /// Record a link target and return it
    pub fn make_target(&mut self, target: &str) -> String {
        self.link_targets.insert(target.to_string());
        target.to_string()
    }

    /// Check if a label exists
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    pub fn has_target(&self, target: &str) -> bool {
        self.link_targets.contains(target)
    }

    /// Labels in registration order
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }
}

/// Convert label to LaTeX
pub fn label_to_latex(id: &str) -> String {
    format!("\\label{{{}}}", id)
}

// ============================================================================
// Tests
// ============================================================================
