#![allow(dead_code)]

use std::path::{Path, PathBuf};

use invoice_import::{
    data::Value,
    dataset::Dataset,
    schema::{INVOICE_COLUMN, REQUIRED_COLUMNS},
};
use tempfile::{TempDir, tempdir};

/// Cell contents for generated spreadsheets.
#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes a single-sheet workbook with `headers` on the first row.
    pub fn write_xlsx(&self, name: &str, headers: &[String], rows: &[Vec<Cell>]) -> PathBuf {
        let path = self.join(name);
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).expect("default sheet");
        for (col, header) in headers.iter().enumerate() {
            sheet
                .get_cell_mut((col as u32 + 1, 1u32))
                .set_value(header.as_str());
        }
        for (row_idx, row) in rows.iter().enumerate() {
            let excel_row = row_idx as u32 + 2;
            for (col, cell) in row.iter().enumerate() {
                let target = sheet.get_cell_mut((col as u32 + 1, excel_row));
                match cell {
                    Cell::Text(text) => {
                        target.set_value(text.as_str());
                    }
                    Cell::Number(number) => {
                        target.set_value_number(*number);
                    }
                    Cell::Blank => {}
                }
            }
        }
        umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write xlsx");
        path
    }

    /// Writes an invoice workbook carrying every required column.
    pub fn write_invoices(&self, name: &str, keys: &[i64]) -> PathBuf {
        let rows = keys.iter().map(|key| invoice_cells(*key)).collect::<Vec<_>>();
        self.write_xlsx(name, &required_headers(), &rows)
    }
}

pub fn required_headers() -> Vec<String> {
    REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
}

fn sample_text(label: &str, key: i64) -> String {
    match label {
        "Cliente" => format!("Cliente {key}"),
        "Cidade" => "Belo Horizonte".to_string(),
        "Empresa" => "Distribuidora Central".to_string(),
        other => format!("{other} {key}"),
    }
}

fn invoice_cells(key: i64) -> Vec<Cell> {
    REQUIRED_COLUMNS
        .iter()
        .map(|label| {
            if *label == INVOICE_COLUMN {
                Cell::Number(key as f64)
            } else if *label == "Valor Bruto" {
                Cell::Number(150.25)
            } else {
                Cell::Text(sample_text(label, key))
            }
        })
        .collect()
}

/// In-memory upload with every required column and the given invoice
/// numbers, as the workbook reader would produce it.
pub fn invoice_upload(keys: &[i64]) -> Dataset {
    let rows = keys
        .iter()
        .map(|key| {
            REQUIRED_COLUMNS
                .iter()
                .map(|label| {
                    Some(if *label == INVOICE_COLUMN {
                        Value::Integer(*key)
                    } else if *label == "Valor Bruto" {
                        Value::Float(150.25)
                    } else {
                        Value::String(sample_text(label, *key))
                    })
                })
                .collect()
        })
        .collect();
    Dataset::new(required_headers(), rows)
}

/// Upload with the named required columns removed.
pub fn upload_without(keys: &[i64], dropped: &[&str]) -> Dataset {
    let full = invoice_upload(keys);
    let keep = full
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, label)| !dropped.contains(&label.as_str()))
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();
    let columns = keep.iter().map(|idx| full.columns()[*idx].clone()).collect();
    let rows = full
        .rows()
        .iter()
        .map(|row| keep.iter().map(|idx| row[*idx].clone()).collect())
        .collect();
    Dataset::new(columns, rows)
}

/// Invoice numbers of a dataset, rendered as text.
pub fn keys_of(rows: &Dataset, column: &str) -> Vec<String> {
    let idx = rows.column_index(column).expect("key column present");
    rows.column_display(idx)
}
