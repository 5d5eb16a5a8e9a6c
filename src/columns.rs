//! Listing of the required spreadsheet columns.
//!
//! Shows each required label next to the database column it is stored
//! under, marking the invoice column used for deduplication.

use anyhow::Result;
use log::info;

use crate::{
    labels::normalize_label,
    schema::{INVOICE_COLUMN, REQUIRED_COLUMNS},
    table,
};

pub fn column_rows() -> Vec<Vec<String>> {
    REQUIRED_COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let key = if *label == INVOICE_COLUMN { "chave" } else { "" };
            vec![
                (idx + 1).to_string(),
                label.to_string(),
                normalize_label(label).into_owned(),
                key.to_string(),
            ]
        })
        .collect()
}

pub fn execute() -> Result<()> {
    let headers = ["#", "planilha", "banco", ""]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let rows = column_rows();
    print!("{}", table::render_table(&headers, &rows));
    info!("Listed {} required column(s)", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_row_is_marked_as_key() {
        let rows = column_rows();
        assert_eq!(rows.len(), REQUIRED_COLUMNS.len());
        let invoice = rows.iter().find(|row| row[3] == "chave").unwrap();
        assert_eq!(invoice[1], INVOICE_COLUMN);
        assert_eq!(invoice[2], "n_nota");
    }
}
