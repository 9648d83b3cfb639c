//! Tables, sections, and table identifiers.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::markers::reference_names;

/// Name of the section that serves as a table's roll entry point.
pub const OUTPUT_SECTION: &str = "output";

/// Stable identifier for a table, derived by the caller from where the
/// definition block was found (e.g. sanitized origin + block index).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TableId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named, ordered group of entries within one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section name, unique within its table (case-insensitive).
    pub name: String,
    /// Candidate entry lines, in definition order.
    pub entries: Vec<String>,
}

impl Section {
    /// Create a section from a name and entries.
    pub fn new(name: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// The entry at `index`, if present.
    pub fn entry(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }
}

/// A parsed random table: a named collection of sections.
///
/// Tables are created once per parsed definition block and never
/// mutated afterwards; callers hold them by shared reference for the
/// lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Stable identifier.
    pub id: TableId,
    /// Display title.
    pub title: String,
    /// Ordered sections.
    pub sections: Vec<Section>,
    /// Every bracket-reference name discovered anywhere in the sections.
    pub references: BTreeSet<String>,
    /// Definition warnings/errors kept for display.
    pub issues: Vec<String>,
}

impl Table {
    /// Build a table, discovering the reference names in its entries.
    pub fn new(
        id: TableId,
        title: impl Into<String>,
        sections: Vec<Section>,
        issues: Vec<String>,
    ) -> Self {
        let references = sections
            .iter()
            .flat_map(|s| s.entries.iter())
            .flat_map(|e| reference_names(e))
            .collect();
        Self {
            id,
            title: title.into(),
            sections,
            references,
            issues,
        }
    }

    /// Look up a section by name, case-insensitively.
    pub fn section(&self, name: &str) -> Option<&Section> {
        let folded = name.to_lowercase();
        self.sections.iter().find(|s| s.name.to_lowercase() == folded)
    }

    /// The `output` section, if the table has one.
    pub fn output(&self) -> Option<&Section> {
        self.section(OUTPUT_SECTION)
    }

    /// The section a full roll starts from: `output`, or the first
    /// section that has entries.
    pub fn entry_point(&self) -> Option<&Section> {
        self.output()
            .filter(|s| !s.entries.is_empty())
            .or_else(|| self.sections.iter().find(|s| !s.entries.is_empty()))
    }

    /// Total number of entries across all sections.
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }
}
