//! CSV export of rows awaiting import, for review outside the terminal.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::info;

use crate::dataset::Dataset;

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

/// Renders `rows` as fully-quoted CSV in the requested encoding.
pub fn to_csv_bytes(rows: &Dataset, encoding: &'static Encoding) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer
        .write_record(rows.columns())
        .context("Writing CSV header")?;
    for (idx, record) in rows.display_rows(None).iter().enumerate() {
        writer
            .write_record(record)
            .with_context(|| format!("Writing CSV row {}", idx + 1))?;
    }
    let utf8 = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV buffer: {}", err.error()))?;
    if encoding == UTF_8 {
        return Ok(utf8);
    }
    let text = String::from_utf8(utf8).context("CSV buffer is not valid UTF-8")?;
    let (encoded, _, had_errors) = encoding.encode(&text);
    if had_errors {
        return Err(anyhow!(
            "Some values cannot be represented in {}",
            encoding.name()
        ));
    }
    Ok(encoded.into_owned())
}

pub fn write_csv(path: &Path, rows: &Dataset, encoding: &'static Encoding) -> Result<()> {
    let bytes = to_csv_bytes(rows, encoding)?;
    fs::write(path, bytes).with_context(|| format!("Writing CSV export {path:?}"))?;
    info!(
        "Exported {} row(s) to {:?} ({})",
        rows.len(),
        path,
        encoding.name()
    );
    Ok(())
}
