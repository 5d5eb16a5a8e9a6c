pub mod check;
pub mod cli;
pub mod columns;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod export;
pub mod import;
pub mod labels;
pub mod novelty;
pub mod schema;
pub mod session;
pub mod store;
pub mod table;
pub mod workbook;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("invoice_import", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Import(args) => import::execute(&args),
        Commands::Check(args) => check::execute(&args),
        Commands::Columns => columns::execute(),
    }
}
