use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet, btree_map::Entry},
};

use super::{TableStore, ensure_writable_labels};
use crate::{
    dataset::Dataset,
    error::{ImportError, ImportResult},
};

/// Process-local tables with the same create-if-absent semantics as the SQL
/// store. Failures can be armed to exercise the error paths of a session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<BTreeMap<String, Dataset>>,
    read_failure: RefCell<Option<String>>,
    write_failure: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str, rows: Dataset) -> Self {
        self.tables.borrow_mut().insert(name.to_string(), rows);
        self
    }

    pub fn table(&self, name: &str) -> Option<Dataset> {
        self.tables.borrow().get(name).cloned()
    }

    pub fn fail_reads_with(&self, message: &str) {
        *self.read_failure.borrow_mut() = Some(message.to_string());
    }

    pub fn fail_writes_with(&self, message: &str) {
        *self.write_failure.borrow_mut() = Some(message.to_string());
    }

    fn armed(slot: &RefCell<Option<String>>) -> Option<String> {
        slot.borrow().clone()
    }
}

impl TableStore for MemoryStore {
    fn table_exists(&self, table: &str) -> ImportResult<bool> {
        if let Some(message) = Self::armed(&self.read_failure) {
            return Err(ImportError::StoreRead(message));
        }
        Ok(self.tables.borrow().contains_key(table))
    }

    fn list_distinct(&self, table: &str, column: &str) -> ImportResult<HashSet<String>> {
        if let Some(message) = Self::armed(&self.read_failure) {
            return Err(ImportError::StoreRead(message));
        }
        let tables = self.tables.borrow();
        let rows = tables
            .get(table)
            .ok_or_else(|| ImportError::StoreRead(format!("no such table: {table}")))?;
        let idx = rows
            .column_index(column)
            .ok_or_else(|| ImportError::StoreRead(format!("no such column: {column}")))?;
        Ok((0..rows.len())
            .filter_map(|row| rows.cell(row, idx).map(|value| value.as_display()))
            .collect())
    }

    fn append_rows(&self, table: &str, rows: &Dataset) -> ImportResult<usize> {
        if let Some(message) = Self::armed(&self.write_failure) {
            return Err(ImportError::StoreWrite(message));
        }
        ensure_writable_labels(rows)?;
        let mut tables = self.tables.borrow_mut();
        match tables.entry(table.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(rows.clone());
                Ok(rows.len())
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if let Some(label) = rows.columns().iter().find(|l| !existing.has_column(l)) {
                    return Err(ImportError::StoreWrite(format!(
                        "table {table} has no column named {label}"
                    )));
                }
                Ok(existing.append_by_label(rows))
            }
        }
    }
}
