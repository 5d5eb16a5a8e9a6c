//! Destination table access.
//!
//! The importer needs exactly two things from persistent storage: the
//! distinct values already stored in the key column, and a create-if-absent
//! append. [`TableStore`] captures that capability so the SQLite engine and
//! the in-memory store used by tests are interchangeable.

pub mod memory;
pub mod sqlite;

use std::collections::HashSet;

use crate::{
    dataset::Dataset,
    error::{ImportError, ImportResult},
};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub trait TableStore {
    fn table_exists(&self, table: &str) -> ImportResult<bool>;

    /// Distinct non-null values of `column`, rendered as text.
    fn list_distinct(&self, table: &str, column: &str) -> ImportResult<HashSet<String>>;

    /// Appends every row, creating the table from the rows' labels when it
    /// does not exist yet. Returns the number of rows written.
    fn append_rows(&self, table: &str, rows: &Dataset) -> ImportResult<usize>;
}

impl<T: TableStore + ?Sized> TableStore for &T {
    fn table_exists(&self, table: &str) -> ImportResult<bool> {
        (**self).table_exists(table)
    }

    fn list_distinct(&self, table: &str, column: &str) -> ImportResult<HashSet<String>> {
        (**self).list_distinct(table, column)
    }

    fn append_rows(&self, table: &str, rows: &Dataset) -> ImportResult<usize> {
        (**self).append_rows(table, rows)
    }
}

/// Rejects datasets a table could not hold: no columns, or two labels that
/// collapsed onto the same name.
pub(crate) fn ensure_writable_labels(rows: &Dataset) -> ImportResult<()> {
    if rows.columns().is_empty() {
        return Err(ImportError::store_write("no columns to append"));
    }
    let mut seen = HashSet::new();
    for label in rows.columns() {
        if !seen.insert(label.as_str()) {
            return Err(ImportError::StoreWrite(format!(
                "duplicate column name: {label}"
            )));
        }
    }
    Ok(())
}
