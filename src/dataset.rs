//! In-memory tabular model shared by the validator, the novelty filter and
//! the stores.
//!
//! A [`Dataset`] is an ordered list of column labels plus rows whose cells
//! line up with those labels by position. Empty cells are `None`.

use crate::data::{Affinity, Value, display_cell};

pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Builds a dataset, padding or truncating each row to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row)?.get(column)?.as_ref()
    }

    /// Text rendering of one column for every row, in row order.
    pub fn column_display(&self, column: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| display_cell(row.get(column).and_then(Option::as_ref)))
            .collect()
    }

    pub fn column_affinity(&self, column: usize) -> Affinity {
        Affinity::infer(
            self.rows
                .iter()
                .map(|row| row.get(column).and_then(Option::as_ref)),
        )
    }

    /// Keeps rows for which `keep` returns true, preserving order.
    pub fn retain_rows<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&Row) -> bool,
    {
        let rows = self.rows.iter().filter(|row| keep(row)).cloned().collect();
        Dataset {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Same rows under new labels.
    pub fn relabel<F>(self, mut rename: F) -> Dataset
    where
        F: FnMut(&str) -> String,
    {
        let columns = self.columns.iter().map(|c| rename(c)).collect();
        Dataset {
            columns,
            rows: self.rows,
        }
    }

    /// Appends rows from another dataset, matching columns by label. Labels
    /// the other dataset lacks are filled with nulls; labels this dataset
    /// lacks are ignored, so callers check them first.
    pub fn append_by_label(&mut self, other: &Dataset) -> usize {
        let mapping = self
            .columns
            .iter()
            .map(|label| other.column_index(label))
            .collect::<Vec<_>>();
        for source in other.rows() {
            let row = mapping
                .iter()
                .map(|idx| idx.and_then(|i| source.get(i).cloned().flatten()))
                .collect();
            self.rows.push(row);
        }
        other.len()
    }

    /// Rows rendered as text, for table previews and CSV export.
    pub fn display_rows(&self, limit: Option<usize>) -> Vec<Vec<String>> {
        let take = limit.unwrap_or(self.rows.len());
        self.rows
            .iter()
            .take(take)
            .map(|row| row.iter().map(|cell| display_cell(cell.as_ref())).collect())
            .collect()
    }
}
