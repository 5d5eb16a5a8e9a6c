//! Error taxonomy for a single import attempt.
//!
//! Every variant is recoverable: the front-end renders it as one message and
//! the operator can retry with a new file or a new confirmation.

use thiserror::Error;

pub type ImportResult<T> = std::result::Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    /// Required labels absent from the upload, in declared order.
    #[error("Colunas Essenciais Ausentes: {}", format_labels(.0))]
    MissingColumns(Vec<String>),
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    StoreRead(String),
    #[error("{0}")]
    StoreWrite(String),
}

impl ImportError {
    pub fn parse(message: impl Into<String>) -> Self {
        ImportError::Parse(message.into())
    }

    pub fn store_read(err: impl std::fmt::Display) -> Self {
        ImportError::StoreRead(err.to_string())
    }

    pub fn store_write(err: impl std::fmt::Display) -> Self {
        ImportError::StoreWrite(err.to_string())
    }

    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            ImportError::MissingColumns(labels) => Some(labels),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::MissingColumns(_) => "schema",
            ImportError::Parse(_) => "parse",
            ImportError::StoreRead(_) => "store-read",
            ImportError::StoreWrite(_) => "store-write",
        }
    }
}

fn format_labels(labels: &[String]) -> String {
    let quoted = labels
        .iter()
        .map(|label| format!("'{label}'"))
        .collect::<Vec<_>>();
    format!("[{}]", quoted.join(", "))
}
