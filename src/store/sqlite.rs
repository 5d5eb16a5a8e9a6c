use std::{
    cell::RefCell,
    collections::HashSet,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{Context, Result, bail};
use log::{debug, info};
use rusqlite::{
    Connection, OptionalExtension, ToSql, params, params_from_iter,
    types::{ToSqlOutput, Value as SqlValue, ValueRef},
};

use super::{TableStore, ensure_writable_labels};
use crate::{
    data::{Value, format_float},
    dataset::Dataset,
    error::{ImportError, ImportResult},
};

const SCHEME: &str = "sqlite:";

#[derive(Debug, Clone)]
enum Location {
    /// One database for the life of the store, shared by its clones.
    Memory(Rc<RefCell<Connection>>),
    File(PathBuf),
}

/// SQLite-backed destination. File databases get a fresh connection for
/// each read or write; an in-memory database keeps its single connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    location: Location,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
        }
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Opening in-memory SQLite database")?;
        Ok(Self {
            location: Location::Memory(Rc::new(RefCell::new(conn))),
        })
    }

    /// Accepts `sqlite:///relative.db`, `sqlite:////absolute.db`,
    /// `sqlite://` / `sqlite:///:memory:` or a bare path.
    pub fn from_url(url: &str) -> Result<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            bail!("Database URL is empty");
        }
        let Some(rest) = trimmed.strip_prefix(SCHEME) else {
            if let Some((scheme, _)) = trimmed.split_once("://") {
                bail!("Unsupported database scheme '{scheme}'; only sqlite is available");
            }
            return Self::from_path(trimmed);
        };
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let path = rest.strip_prefix('/').unwrap_or(rest);
        Self::from_path(path)
    }

    fn from_path(path: &str) -> Result<Self> {
        if path.is_empty() || path == ":memory:" {
            Self::in_memory()
        } else {
            Ok(Self::open(path))
        }
    }

    /// Database file, or `None` for an in-memory database.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory(_) => None,
        }
    }

    fn with_connection<T, F>(&self, work: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T>,
    {
        match &self.location {
            Location::Memory(shared) => work(&mut shared.borrow_mut()),
            Location::File(path) => {
                let mut conn = Connection::open(path)?;
                work(&mut conn)
            }
        }
    }
}

impl TableStore for SqliteStore {
    fn table_exists(&self, table: &str) -> ImportResult<bool> {
        let found = self
            .with_connection(|conn| {
                conn.query_row(
                    "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    params![table],
                    |_| Ok(()),
                )
                .optional()
            })
            .map_err(ImportError::store_read)?;
        Ok(found.is_some())
    }

    fn list_distinct(&self, table: &str, column: &str) -> ImportResult<HashSet<String>> {
        let sql = format!(
            "SELECT DISTINCT {} FROM {}",
            quote_identifier(column),
            quote_identifier(table)
        );
        let keys = self
            .with_connection(|conn| {
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query([])?;
                let mut keys = HashSet::new();
                while let Some(row) = rows.next()? {
                    if let Some(key) = render_key(row.get_ref(0)?) {
                        keys.insert(key);
                    }
                }
                Ok(keys)
            })
            .map_err(ImportError::store_read)?;
        debug!("Read {} distinct value(s) of {table}.{column}", keys.len());
        Ok(keys)
    }

    fn append_rows(&self, table: &str, rows: &Dataset) -> ImportResult<usize> {
        ensure_writable_labels(rows)?;
        let written = self
            .with_connection(|conn| {
                let tx = conn.transaction()?;
                tx.execute(&create_table_sql(table, rows), [])?;
                let mut written = 0usize;
                {
                    let mut stmt = tx.prepare(&insert_sql(table, rows.columns()))?;
                    for row in rows.rows() {
                        written += stmt.execute(params_from_iter(
                            row.iter().map(|cell| SqlCell(cell.as_ref())),
                        ))?;
                    }
                }
                tx.commit()?;
                Ok(written)
            })
            .map_err(ImportError::store_write)?;
        info!("Appended {written} row(s) to {table}");
        Ok(written)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(table: &str, rows: &Dataset) -> String {
    let columns = rows
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            format!(
                "{} {}",
                quote_identifier(label),
                rows.column_affinity(idx).as_sql()
            )
        })
        .collect::<Vec<_>>();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(table),
        columns.join(", ")
    )
}

fn insert_sql(table: &str, columns: &[String]) -> String {
    let names = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>();
    let placeholders = (1..=columns.len())
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

fn render_key(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(format_float(f)),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

struct SqlCell<'a>(Option<&'a Value>);

impl ToSql for SqlCell<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let output = match self.0 {
            None => ToSqlOutput::Owned(SqlValue::Null),
            Some(Value::String(s)) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Some(Value::Integer(i)) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Some(Value::Float(f)) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Some(Value::Boolean(b)) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Some(other @ (Value::DateTime(_) | Value::Time(_))) => {
                ToSqlOutput::Owned(SqlValue::Text(other.as_display()))
            }
        };
        Ok(output)
    }
}
