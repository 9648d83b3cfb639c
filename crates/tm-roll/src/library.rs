//! Lookup of known tables by identifier or title.

use std::collections::HashMap;

use tm_core::Table;

/// The set of known tables a resolution can reference.
///
/// Lookup is exact on table ids and case-insensitive on titles; when
/// several tables share a title, the first inserted wins. The library
/// is read-only once populated — on a vault refresh, callers build a
/// new one rather than mutating a library a roll may be reading.
#[derive(Debug, Default)]
pub struct TableLibrary {
    tables: Vec<Table>,
    by_id: HashMap<String, usize>,
    by_title: HashMap<String, usize>,
}

impl TableLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from parsed tables.
    pub fn from_tables(tables: Vec<Table>) -> Self {
        let mut library = Self::new();
        for table in tables {
            library.insert(table);
        }
        library
    }

    /// Add a table. First insertion wins for a contested title or id.
    pub fn insert(&mut self, table: Table) {
        let index = self.tables.len();
        self.by_id
            .entry(table.id.as_str().to_string())
            .or_insert(index);
        self.by_title
            .entry(table.title.to_lowercase())
            .or_insert(index);
        self.tables.push(table);
    }

    /// Look up a table by id (exact) or title (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.by_id
            .get(name)
            .or_else(|| self.by_title.get(&name.to_lowercase()))
            .map(|&i| &self.tables[i])
    }

    /// All tables, in insertion order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Number of tables in the library.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the library has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
