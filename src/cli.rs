use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Append new invoices from a spreadsheet to a SQL table",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate spreadsheets, show new invoices and append them on confirmation
    Import(ImportArgs),
    /// Validate and filter spreadsheets without writing to the database
    Check(CheckArgs),
    /// List the required spreadsheet columns and their database names
    Columns,
}

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Database connection string (sqlite:///path.db or a file path)
    #[arg(long = "db-url", env = "DB_URL")]
    pub db_url: Option<String>,
    /// Destination table name
    #[arg(long = "table", env = "TABLE_NAME")]
    pub table: Option<String>,
    /// YAML settings file providing `db_url` and `table_name`
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Spreadsheet(s) to import (.xlsx); each one is handled independently
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    #[command(flatten)]
    pub store: StoreArgs,
    /// Append without asking for confirmation
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
    /// Number of new rows to preview before confirming (0 disables)
    #[arg(long, default_value_t = 10)]
    pub preview: usize,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Spreadsheet to check (.xlsx)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub store: StoreArgs,
    /// Number of new rows to preview (0 disables)
    #[arg(long, default_value_t = 10)]
    pub preview: usize,
    /// Write the new rows, with database column names, to a CSV file
    #[arg(long = "export-pending")]
    pub export_pending: Option<PathBuf>,
    /// Character encoding for the exported CSV (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Print a JSON summary instead of the human-readable report
    #[arg(long)]
    pub json: bool,
}
