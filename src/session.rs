//! Upload → validate → filter → confirm → commit, independent of any UI.
//!
//! An [`ImportSession`] holds exactly one file's progress. Each action runs
//! synchronously to its next resting state: `upload` ends in `Error`, `NoOp`
//! or `AwaitingConfirmation`; `confirm` ends in `Committed` or `Error`.
//! Uploading again always starts over from `Idle`.

use std::path::Path;

use log::{debug, info, warn};

use crate::{
    config::Config,
    dataset::Dataset,
    error::ImportError,
    novelty, schema,
    store::TableStore,
    workbook,
};

pub const ALREADY_IMPORTED_MESSAGE: &str =
    "Todos os registros desta planilha já existem no banco de dados.";
pub const COMMITTING_MESSAGE: &str = "Enviando novos dados...";

/// Rows waiting for the operator's go-ahead.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImport {
    pub rows: Dataset,
    pub uploaded: usize,
}

impl PendingImport {
    pub fn new_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn already_present(&self) -> usize {
        self.uploaded - self.rows.len()
    }
}

#[derive(Debug)]
pub enum SessionState {
    Idle,
    Parsed(Dataset),
    Reviewed(PendingImport),
    AwaitingConfirmation(PendingImport),
    Committing(PendingImport),
    NoOp { uploaded: usize },
    Committed { appended: usize },
    Error(ImportError),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Parsed(_) => "parsed",
            SessionState::Reviewed(_) => "reviewed",
            SessionState::AwaitingConfirmation(_) => "awaiting-confirmation",
            SessionState::Committing(_) => "committing",
            SessionState::NoOp { .. } => "no-op",
            SessionState::Committed { .. } => "committed",
            SessionState::Error(_) => "error",
        }
    }

    /// `Error`, `NoOp` and `Committed` end the current file.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Error(_) | SessionState::NoOp { .. } | SessionState::Committed { .. }
        )
    }

    pub fn pending(&self) -> Option<&PendingImport> {
        match self {
            SessionState::Reviewed(pending)
            | SessionState::AwaitingConfirmation(pending)
            | SessionState::Committing(pending) => Some(pending),
            _ => None,
        }
    }

    /// Confirmation is offered only while rows are waiting.
    pub fn can_confirm(&self) -> bool {
        matches!(self, SessionState::AwaitingConfirmation(_))
    }

    /// The line shown to the operator for this state, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            SessionState::Idle | SessionState::Parsed(_) | SessionState::Reviewed(_) => None,
            SessionState::AwaitingConfirmation(pending) => Some(format!(
                "{} novos registros de {} encontrados na planilha.",
                pending.new_rows(),
                pending.uploaded
            )),
            SessionState::Committing(_) => Some(COMMITTING_MESSAGE.to_string()),
            SessionState::NoOp { .. } => Some(ALREADY_IMPORTED_MESSAGE.to_string()),
            SessionState::Committed { appended } => Some(format!(
                "{appended} novos registros adicionados com sucesso!"
            )),
            SessionState::Error(err) => Some(format!("Erro ao processar: {err}")),
        }
    }
}

pub struct ImportSession<'a, S: TableStore> {
    config: &'a Config,
    store: S,
    state: SessionState,
}

impl<'a, S: TableStore> ImportSession<'a, S> {
    pub fn new(config: &'a Config, store: S) -> Self {
        Self {
            config,
            store,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    /// Decodes a spreadsheet and runs it through the session. Decoding
    /// failures land in `Error` like any other failure.
    pub fn upload_path(&mut self, path: &Path) -> &SessionState {
        self.reset();
        info!("Reading {}", path.display());
        match workbook::read_workbook_path(path) {
            Ok(dataset) => self.advance_parsed(dataset),
            Err(err) => self.fail(err),
        }
        &self.state
    }

    /// Runs an already-decoded dataset through validation and filtering.
    pub fn upload(&mut self, dataset: Dataset) -> &SessionState {
        self.reset();
        self.advance_parsed(dataset);
        &self.state
    }

    /// Appends the pending rows. Outside `AwaitingConfirmation` this does
    /// nothing and the state is left as it was.
    pub fn confirm(&mut self) -> &SessionState {
        let pending = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::AwaitingConfirmation(pending) => pending,
            other => {
                debug!("Ignoring confirmation while {}", other.name());
                self.state = other;
                return &self.state;
            }
        };
        self.transition(SessionState::Committing(pending));
        let outcome = match self.state.pending() {
            Some(pending) => self
                .store
                .append_rows(&self.config.table_name, &pending.rows),
            None => return &self.state,
        };
        match outcome {
            Ok(appended) => self.transition(SessionState::Committed { appended }),
            Err(err) => self.fail(err),
        }
        &self.state
    }

    fn reset(&mut self) {
        if !matches!(self.state, SessionState::Idle) {
            debug!("Discarding {} session for a new upload", self.state.name());
        }
        self.state = SessionState::Idle;
    }

    fn advance_parsed(&mut self, dataset: Dataset) {
        self.transition(SessionState::Parsed(dataset));
        let reviewed = match &self.state {
            SessionState::Parsed(dataset) => {
                review(dataset, &self.store, &self.config.table_name)
            }
            _ => return,
        };
        match reviewed {
            Ok(pending) => {
                self.transition(SessionState::Reviewed(pending));
                self.settle_review();
            }
            Err(err) => self.fail(err),
        }
    }

    fn settle_review(&mut self) {
        let state = std::mem::replace(&mut self.state, SessionState::Idle);
        self.state = match state {
            SessionState::Reviewed(pending) if pending.rows.is_empty() => SessionState::NoOp {
                uploaded: pending.uploaded,
            },
            SessionState::Reviewed(pending) => SessionState::AwaitingConfirmation(pending),
            other => other,
        };
        debug!("Session reviewed -> {}", self.state.name());
    }

    fn fail(&mut self, err: ImportError) {
        warn!("Import failed ({}): {err}", err.kind());
        self.transition(SessionState::Error(err));
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {} -> {}", self.state.name(), next.name());
        self.state = next;
    }
}

fn review<S: TableStore>(
    dataset: &Dataset,
    store: &S,
    table: &str,
) -> Result<PendingImport, ImportError> {
    schema::validate(dataset)?;
    let rows = novelty::filter_new_rows(dataset, store, table)?;
    Ok(PendingImport {
        rows,
        uploaded: dataset.len(),
    })
}
