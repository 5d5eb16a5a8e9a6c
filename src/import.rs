//! Interactive `import` command.
//!
//! Each spreadsheet runs through its own pass of the [`ImportSession`]:
//! a failure is reported and the next file still gets processed.

use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use anyhow::{Result, bail};
use log::{info, warn};

use crate::{
    cli::ImportArgs,
    config::Config,
    session::{COMMITTING_MESSAGE, ImportSession, PendingImport, SessionState},
    store::TableStore,
    table,
};

pub const DECLINED_MESSAGE: &str = "Nenhum dado enviado.";

/// Decides whether pending rows should be appended.
pub trait Confirmation {
    fn confirm(&mut self, pending: &PendingImport, table: &str) -> Result<bool>;
}

/// Approves every import, for `--yes`.
pub struct AutoConfirm;

impl Confirmation for AutoConfirm {
    fn confirm(&mut self, _pending: &PendingImport, _table: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Asks on `output` and reads one answer line from `input`. End of input
/// counts as "no".
pub struct PromptConfirmation<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirmation<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirmation for PromptConfirmation<R, W> {
    fn confirm(&mut self, pending: &PendingImport, table: &str) -> Result<bool> {
        write!(
            self.output,
            "Enviar {} novos registros para '{table}'? [s/N] ",
            pending.new_rows()
        )?;
        self.output.flush()?;
        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(is_affirmative(&answer))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Failed,
    AlreadyImported,
    Declined { pending: usize },
    Committed { appended: usize },
}

impl FileOutcome {
    fn from_state(state: &SessionState) -> Self {
        match state {
            SessionState::Error(_) => FileOutcome::Failed,
            SessionState::NoOp { .. } => FileOutcome::AlreadyImported,
            SessionState::Committed { appended } => FileOutcome::Committed {
                appended: *appended,
            },
            other => FileOutcome::Declined {
                pending: other.pending().map_or(0, PendingImport::new_rows),
            },
        }
    }
}

pub fn execute(args: &ImportArgs) -> Result<()> {
    let config = Config::resolve(&args.store)?;
    let store = config.open_store()?;
    info!(
        "Importing {} spreadsheet(s) into '{}'",
        args.inputs.len(),
        config.table_name
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut confirmation: Box<dyn Confirmation> = if args.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(PromptConfirmation::new(io::stdin().lock(), io::stdout()))
    };

    let mut session = ImportSession::new(&config, &store);
    let mut failed = 0usize;
    let mut appended = 0usize;
    for input in &args.inputs {
        match import_file(&mut session, input, args.preview, confirmation.as_mut(), &mut out)? {
            FileOutcome::Failed => failed += 1,
            FileOutcome::Committed { appended: count } => appended += count,
            FileOutcome::AlreadyImported | FileOutcome::Declined { .. } => {}
        }
    }
    info!(
        "Appended {appended} row(s) from {} spreadsheet(s); {failed} failed",
        args.inputs.len()
    );
    if failed > 0 {
        bail!(
            "{failed} of {} spreadsheet(s) could not be imported",
            args.inputs.len()
        );
    }
    Ok(())
}

/// Runs one spreadsheet from upload to its resting state, reporting every
/// step on `out`.
pub fn import_file<S, C, W>(
    session: &mut ImportSession<'_, S>,
    path: &Path,
    preview: usize,
    confirmation: &mut C,
    out: &mut W,
) -> Result<FileOutcome>
where
    S: TableStore,
    C: Confirmation + ?Sized,
    W: Write,
{
    writeln!(out, "== {}", path.display())?;
    session.upload_path(path);
    let state = session.state();
    if let Some(message) = state.message() {
        writeln!(out, "{message}")?;
    }
    let SessionState::AwaitingConfirmation(pending) = state else {
        return Ok(FileOutcome::from_state(state));
    };
    if preview > 0 {
        let rows = pending.rows.display_rows(Some(preview));
        write!(out, "{}", table::render_table(pending.rows.columns(), &rows))?;
        if pending.new_rows() > preview {
            writeln!(out, "... e mais {} registros", pending.new_rows() - preview)?;
        }
    }

    match confirmation.confirm(pending, session.table_name()) {
        Ok(true) => {}
        Ok(false) => {
            writeln!(out, "{DECLINED_MESSAGE}")?;
            return Ok(FileOutcome::from_state(session.state()));
        }
        Err(err) => {
            warn!("Confirmation for {} failed: {err:#}", path.display());
            writeln!(out, "Erro ao processar: {err:#}")?;
            return Ok(FileOutcome::Failed);
        }
    }

    writeln!(out, "{COMMITTING_MESSAGE}")?;
    let state = session.confirm();
    if let Some(message) = state.message() {
        writeln!(out, "{message}")?;
    }
    Ok(FileOutcome::from_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use std::io::Cursor;

    fn pending(rows: usize) -> PendingImport {
        PendingImport {
            rows: Dataset::new(vec!["n_nota".into()], vec![vec![None]; rows]),
            uploaded: rows,
        }
    }

    #[test]
    fn affirmative_answers_accept_portuguese_and_english() {
        for answer in ["s\n", "SIM", " y ", "Yes\r\n"] {
            assert!(is_affirmative(answer), "{answer:?}");
        }
        for answer in ["", "n", "nao", "talvez"] {
            assert!(!is_affirmative(answer), "{answer:?}");
        }
    }

    #[test]
    fn prompt_reads_one_answer_and_treats_eof_as_no() {
        let mut output = Vec::new();
        let mut prompt = PromptConfirmation::new(Cursor::new("sim\n"), &mut output);
        assert!(prompt.confirm(&pending(2), "faturas").unwrap());
        assert!(!prompt.confirm(&pending(2), "faturas").unwrap());
        drop(prompt);
        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("Enviar 2 novos registros para 'faturas'? [s/N] "));
    }
}
