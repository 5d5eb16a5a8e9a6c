mod common;

use common::{TestWorkspace, invoice_upload, keys_of, upload_without};
use invoice_import::{
    config::Config,
    data::Value,
    dataset::Dataset,
    schema::key_column,
    session::{ALREADY_IMPORTED_MESSAGE, ImportSession, SessionState},
    store::{MemoryStore, SqliteStore, TableStore},
};

const TABLE: &str = "faturas";

fn config() -> Config {
    Config::new("sqlite://", TABLE).expect("config")
}

fn stored(keys: &[i64]) -> Dataset {
    Dataset::new(
        vec![key_column()],
        keys.iter().map(|k| vec![Some(Value::Integer(*k))]).collect(),
    )
}

#[test]
fn new_rows_wait_for_confirmation_then_commit() {
    let config = config();
    let store = MemoryStore::new().with_table(TABLE, stored(&[100]));
    let mut session = ImportSession::new(&config, &store);

    let state = session.upload(invoice_upload(&[100, 101, 102]));
    assert!(state.can_confirm());
    let pending = state.pending().expect("pending rows");
    assert_eq!(pending.new_rows(), 2);
    assert_eq!(pending.already_present(), 1);
    assert!(store.table(TABLE).expect("table").len() == 1);

    let state = session.confirm();
    assert!(matches!(state, SessionState::Committed { appended: 2 }));
    assert_eq!(
        state.message().as_deref(),
        Some("2 novos registros adicionados com sucesso!")
    );

    let table = store.table(TABLE).expect("table");
    assert_eq!(keys_of(&table, &key_column()), vec!["100", "101", "102"]);
}

#[test]
fn nothing_new_ends_without_a_write() {
    let config = config();
    let store = MemoryStore::new().with_table(TABLE, stored(&[1, 2]));
    store.fail_writes_with("writes are not expected");
    let mut session = ImportSession::new(&config, &store);

    let state = session.upload(invoice_upload(&[1, 2, 2]));
    assert!(matches!(state, SessionState::NoOp { uploaded: 3 }));
    assert!(state.is_terminal());
    assert!(!state.can_confirm());
    assert_eq!(state.message().as_deref(), Some(ALREADY_IMPORTED_MESSAGE));

    let state = session.confirm();
    assert!(matches!(state, SessionState::NoOp { .. }));
    assert_eq!(store.table(TABLE).expect("table").len(), 2);
}

#[test]
fn missing_columns_stop_before_the_store_is_read() {
    let config = config();
    let store = MemoryStore::new();
    store.fail_reads_with("reads are not expected");
    let mut session = ImportSession::new(&config, &store);

    let state = session.upload(upload_without(&[1], &["Vencto", "Atendente"]));
    let SessionState::Error(err) = state else {
        panic!("expected error, got {}", state.name());
    };
    assert_eq!(err.kind(), "schema");
    assert_eq!(
        state.message().as_deref(),
        Some("Erro ao processar: Colunas Essenciais Ausentes: ['Vencto', 'Atendente']")
    );
}

#[test]
fn failed_write_returns_to_error_and_can_start_over() {
    let config = config();
    let store = MemoryStore::new();
    store.fail_writes_with("disk I/O error");
    let mut session = ImportSession::new(&config, &store);

    assert!(session.upload(invoice_upload(&[7])).can_confirm());
    let state = session.confirm();
    assert!(state.is_terminal());
    assert_eq!(state.name(), "error");
    assert_eq!(
        state.message().as_deref(),
        Some("Erro ao processar: disk I/O error")
    );
    assert!(store.table(TABLE).is_none());

    let state = session.upload(invoice_upload(&[7, 8]));
    assert_eq!(state.pending().map(|p| p.new_rows()), Some(2));
}

#[test]
fn confirm_outside_awaiting_confirmation_is_ignored() {
    let config = config();
    let store = MemoryStore::new();
    let mut session = ImportSession::new(&config, &store);
    assert!(matches!(session.confirm(), SessionState::Idle));
    assert!(store.table(TABLE).is_none());
}

#[test]
fn second_upload_replaces_pending_rows() {
    let config = config();
    let store = MemoryStore::new();
    let mut session = ImportSession::new(&config, &store);
    session.upload(invoice_upload(&[1, 2, 3]));
    session.upload(invoice_upload(&[9]));
    assert!(matches!(session.confirm(), SessionState::Committed { appended: 1 }));
    let table = store.table(TABLE).expect("table");
    assert_eq!(keys_of(&table, &key_column()), vec!["9"]);
}

#[test]
fn spreadsheet_upload_commits_into_sqlite() {
    let workspace = TestWorkspace::new();
    let db = workspace.join("vendas.db");
    let config = Config::new(format!("sqlite:///{}", db.display()), TABLE).expect("config");
    let store = config.open_store().expect("store");
    let mut session = ImportSession::new(&config, &store);

    let first = workspace.write_invoices("janeiro.xlsx", &[100, 101]);
    assert!(session.upload_path(&first).can_confirm());
    assert!(matches!(session.confirm(), SessionState::Committed { appended: 2 }));

    let second = workspace.write_invoices("fevereiro.xlsx", &[101, 102]);
    let state = session.upload_path(&second);
    assert_eq!(state.pending().map(|p| p.new_rows()), Some(1));
    assert!(matches!(session.confirm(), SessionState::Committed { appended: 1 }));

    let reopened = SqliteStore::open(&db);
    let keys = reopened.list_distinct(TABLE, &key_column()).expect("keys");
    assert_eq!(keys.len(), 3);
    assert!(keys.contains("102"));
}

#[test]
fn in_memory_database_remembers_committed_invoices() {
    let config = config();
    let store = config.open_store().expect("store");
    assert!(store.path().is_none());
    let mut session = ImportSession::new(&config, &store);

    assert!(session.upload(invoice_upload(&[100, 101])).can_confirm());
    assert!(matches!(session.confirm(), SessionState::Committed { appended: 2 }));
    assert!(store.table_exists(TABLE).expect("exists"));

    let state = session.upload(invoice_upload(&[100, 101]));
    assert!(matches!(state, SessionState::NoOp { uploaded: 2 }));

    let state = session.upload(invoice_upload(&[101, 102]));
    assert_eq!(state.pending().map(|p| p.new_rows()), Some(1));
    assert!(matches!(session.confirm(), SessionState::Committed { appended: 1 }));
    let keys = store.list_distinct(TABLE, &key_column()).expect("keys");
    assert_eq!(keys.len(), 3);
}

#[test]
fn unreadable_file_is_a_parse_error() {
    let workspace = TestWorkspace::new();
    let config = config();
    let store = MemoryStore::new();
    let mut session = ImportSession::new(&config, &store);
    let state = session.upload_path(&workspace.join("faltando.xlsx"));
    let SessionState::Error(err) = state else {
        panic!("expected error, got {}", state.name());
    };
    assert_eq!(err.kind(), "parse");
}
