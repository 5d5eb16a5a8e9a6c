//! `.xlsx` intake: first worksheet, first row as header.

use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use calamine::{Data, Reader, Xlsx};
use chrono::{NaiveDate, TimeDelta};
use log::debug;

use crate::{
    data::Value,
    dataset::{Dataset, Row},
    error::{ImportError, ImportResult},
};

/// Largest float that still converts to an integer without losing digits.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn read_workbook_path(path: &Path) -> ImportResult<Dataset> {
    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if !is_xlsx {
        return Err(ImportError::parse(format!(
            "{} is not an .xlsx spreadsheet",
            path.display()
        )));
    }
    let file = File::open(path)
        .map_err(|err| ImportError::parse(format!("Opening {}: {err}", path.display())))?;
    read_workbook(BufReader::new(file))
}

pub fn read_workbook<RS: Read + Seek>(reader: RS) -> ImportResult<Dataset> {
    let mut workbook = Xlsx::new(reader)
        .map_err(|err| ImportError::parse(format!("Failed to open workbook: {err}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::parse("Workbook has no worksheets"))?
        .map_err(|err| ImportError::parse(format!("Failed to read first worksheet: {err}")))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Dataset::default());
    };
    let columns = header_labels(header);
    let data = rows
        .map(|cells| cells.iter().map(cell_value).collect::<Row>())
        .filter(|row| row.iter().any(Option::is_some))
        .collect::<Vec<_>>();
    debug!(
        "Decoded {} column(s) and {} row(s) from first worksheet",
        columns.len(),
        data.len()
    );
    Ok(Dataset::new(columns, data))
}

/// Blank headers become `Unnamed: <idx>`; repeats get the first free
/// `.1`, `.2`, ... suffix, skipping labels already present in the row.
fn header_labels(cells: &[Data]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = header_text(cell).unwrap_or_else(|| format!("Unnamed: {idx}"));
            let mut label = base.clone();
            if taken.contains(&label) {
                let suffix = suffixes.entry(base.clone()).or_insert(0);
                while taken.contains(&label) {
                    *suffix += 1;
                    label = format!("{base}.{suffix}");
                }
            }
            taken.insert(label.clone());
            label
        })
        .collect()
}

fn header_text(cell: &Data) -> Option<String> {
    match cell_value(cell)? {
        Value::String(s) if s.trim().is_empty() => None,
        value => Some(value.as_display()),
    }
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            Some(Value::String(s.clone()))
        }
        Data::Int(i) => Some(Value::Integer(*i)),
        Data::Float(f) => Some(number_value(*f)),
        Data::Bool(b) => Some(Value::Boolean(*b)),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            Some(excel_serial_value(serial).unwrap_or(Value::Float(serial)))
        }
    }
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        Value::Integer(value as i64)
    } else {
        Value::Float(value)
    }
}

/// Excel serials count days from 1899-12-30; serials below one day carry
/// only a time of day.
fn excel_serial_value(serial: f64) -> Option<Value> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;
    let moment = epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)?;
    if (0.0..1.0).contains(&serial) {
        Some(Value::Time(moment.time()))
    } else {
        Some(Value::DateTime(moment))
    }
}
