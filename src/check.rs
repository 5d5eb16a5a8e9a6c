//! Dry-run `check` command: validate and filter one spreadsheet without
//! appending anything.

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use serde::Serialize;

use crate::{
    cli::CheckArgs,
    config::Config,
    export,
    session::{ImportSession, SessionState},
    table,
};

/// Machine-readable outcome of a dry run, printed with `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub file: String,
    pub table: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<usize>,
    pub new_rows: usize,
    pub already_present: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckSummary {
    pub fn from_state(file: &Path, table: &str, state: &SessionState) -> Self {
        let mut summary = CheckSummary {
            file: file.display().to_string(),
            table: table.to_string(),
            status: state.name(),
            uploaded: None,
            new_rows: 0,
            already_present: 0,
            missing_columns: Vec::new(),
            error: None,
        };
        match state {
            SessionState::NoOp { uploaded } => {
                summary.uploaded = Some(*uploaded);
                summary.already_present = *uploaded;
            }
            SessionState::Error(err) => {
                summary.missing_columns = err.missing_columns().unwrap_or_default().to_vec();
                summary.error = Some(err.to_string());
            }
            other => {
                if let Some(pending) = other.pending() {
                    summary.uploaded = Some(pending.uploaded);
                    summary.new_rows = pending.new_rows();
                    summary.already_present = pending.already_present();
                }
            }
        }
        summary
    }
}

pub fn execute(args: &CheckArgs) -> Result<()> {
    let encoding = export::resolve_encoding(args.output_encoding.as_deref())?;
    let config = Config::resolve(&args.store)?;
    let store = config.open_store()?;
    let mut session = ImportSession::new(&config, &store);
    let state = session.upload_path(&args.input);
    let summary = CheckSummary::from_state(&args.input, &config.table_name, state);

    if let Some(path) = &args.export_pending {
        match state.pending() {
            Some(pending) => export::write_csv(path, &pending.rows, encoding)?,
            None => info!("No pending rows to export to {path:?}"),
        }
    }

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&summary).context("Serializing check summary")?;
        println!("{rendered}");
    } else if !matches!(state, SessionState::Error(_)) {
        if let Some(message) = state.message() {
            println!("{message}");
        }
        if let Some(pending) = state.pending().filter(|_| args.preview > 0) {
            let rows = pending.rows.display_rows(Some(args.preview));
            print!("{}", table::render_table(pending.rows.columns(), &rows));
        }
    }

    if let SessionState::Error(err) = state {
        bail!("Erro ao processar: {err}");
    }
    Ok(())
}
