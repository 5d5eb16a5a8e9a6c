//! Anti-join of an upload against the destination table's invoice numbers.

use std::collections::HashSet;

use log::{debug, info};

use crate::{
    data::display_cell,
    dataset::Dataset,
    error::{ImportError, ImportResult},
    labels::normalize_label,
    schema::{INVOICE_COLUMN, key_column},
    store::TableStore,
};

/// Invoice numbers already present in `table`, or an empty set when the
/// table has not been created yet.
pub fn existing_keys<S: TableStore>(store: &S, table: &str) -> ImportResult<HashSet<String>> {
    if !store.table_exists(table)? {
        debug!("Destination table {table} does not exist yet");
        return Ok(HashSet::new());
    }
    store.list_distinct(table, &key_column())
}

/// Rows of `dataset` whose invoice number is absent from `existing`, in
/// upload order, relabelled with normalized column names.
pub fn retain_new_rows(dataset: &Dataset, existing: &HashSet<String>) -> ImportResult<Dataset> {
    let key_idx = dataset
        .column_index(INVOICE_COLUMN)
        .ok_or_else(|| ImportError::MissingColumns(vec![INVOICE_COLUMN.to_string()]))?;
    let fresh = dataset.retain_rows(|row| {
        let key = display_cell(row.get(key_idx).and_then(Option::as_ref));
        !existing.contains(&key)
    });
    Ok(fresh.relabel(|label| normalize_label(label).into_owned()))
}

/// Reads the existing keys once and returns the upload's new rows.
pub fn filter_new_rows<S: TableStore>(
    dataset: &Dataset,
    store: &S,
    table: &str,
) -> ImportResult<Dataset> {
    let existing = existing_keys(store, table)?;
    let fresh = retain_new_rows(dataset, &existing)?;
    info!(
        "{} of {} uploaded row(s) are new to {table} ({} existing key(s))",
        fresh.len(),
        dataset.len(),
        existing.len()
    );
    Ok(fresh)
}
