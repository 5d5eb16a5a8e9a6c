//! Process-wide settings, resolved once at startup.
//!
//! Command-line flags (which clap also fills from `DB_URL` / `TABLE_NAME`)
//! take precedence over an optional YAML settings file.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow, ensure};
use log::info;
use serde::Deserialize;

use crate::{cli::StoreArgs, store::SqliteStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub table_name: String,
}

/// Shape of the YAML settings file; either key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    db_url: Option<String>,
    table_name: Option<String>,
}

impl Config {
    pub fn new(db_url: impl Into<String>, table_name: impl Into<String>) -> Result<Self> {
        let config = Self {
            db_url: db_url.into().trim().to_string(),
            table_name: table_name.into().trim().to_string(),
        };
        ensure!(!config.db_url.is_empty(), "DB_URL must not be empty");
        ensure!(!config.table_name.is_empty(), "TABLE_NAME must not be empty");
        Ok(config)
    }

    pub fn resolve(args: &StoreArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => load_settings(path)?,
            None => SettingsFile::default(),
        };
        let db_url = args
            .db_url
            .clone()
            .or(file.db_url)
            .ok_or_else(|| anyhow!("No database configured; set DB_URL or pass --db-url"))?;
        let table_name = args
            .table
            .clone()
            .or(file.table_name)
            .ok_or_else(|| anyhow!("No destination table configured; set TABLE_NAME or pass --table"))?;
        Self::new(db_url, table_name)
    }

    pub fn open_store(&self) -> Result<SqliteStore> {
        let store = SqliteStore::from_url(&self.db_url)
            .with_context(|| format!("Opening database '{}'", self.db_url))?;
        match store.path() {
            Some(path) => info!("Using SQLite database {}", path.display()),
            None => info!("Using in-memory SQLite database; rows last until exit"),
        }
        Ok(store)
    }
}

fn load_settings(path: &Path) -> Result<SettingsFile> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Opening settings file {path:?}"))?;
    serde_yaml::from_str(&raw).with_context(|| format!("Parsing settings file {path:?}"))
}
