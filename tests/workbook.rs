mod common;

use common::{Cell, TestWorkspace};
use invoice_import::{data::Value, workbook};

#[test]
fn first_sheet_is_decoded_with_typed_cells() {
    let workspace = TestWorkspace::new();
    let headers = vec!["Nº Nota".to_string(), String::new(), "Valor Bruto".to_string()];
    let path = workspace.write_xlsx(
        "vendas.xlsx",
        &headers,
        &[
            vec![Cell::Number(101.0), "Ana".into(), Cell::Number(10.5)],
            vec![Cell::Blank, Cell::Blank, Cell::Blank],
            vec![Cell::Number(102.0), Cell::Blank, Cell::Number(7.0)],
        ],
    );

    let dataset = workbook::read_workbook_path(&path).expect("decode");
    assert_eq!(dataset.columns(), ["Nº Nota", "Unnamed: 1", "Valor Bruto"]);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.cell(0, 0), Some(&Value::Integer(101)));
    assert_eq!(dataset.cell(0, 1), Some(&Value::String("Ana".into())));
    assert_eq!(dataset.cell(0, 2), Some(&Value::Float(10.5)));
    assert_eq!(dataset.cell(1, 1), None);
    assert_eq!(dataset.cell(1, 2), Some(&Value::Integer(7)));
}

#[test]
fn other_extensions_are_rejected() {
    let workspace = TestWorkspace::new();
    let path = workspace.join("vendas.csv");
    std::fs::write(&path, "Nº Nota\n1\n").expect("write csv");
    let err = workbook::read_workbook_path(&path).unwrap_err();
    assert_eq!(err.kind(), "parse");
    assert!(err.to_string().contains("not an .xlsx"));
}

#[test]
fn corrupt_workbook_is_a_parse_error() {
    let workspace = TestWorkspace::new();
    let path = workspace.join("quebrado.xlsx");
    std::fs::write(&path, b"not a zip archive").expect("write bytes");
    let err = workbook::read_workbook_path(&path).unwrap_err();
    assert_eq!(err.kind(), "parse");
}
