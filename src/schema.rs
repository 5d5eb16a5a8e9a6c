//! Required column set and upload validation.
//!
//! Labels are compared exactly as typed in the source spreadsheets (pt-BR,
//! accents and casing included). Extra columns are accepted and travel with
//! the rows into the destination table.

use log::debug;

use crate::{
    dataset::Dataset,
    error::{ImportError, ImportResult},
    labels::normalize_label,
};

/// Label of the invoice number column used as the deduplication key.
pub const INVOICE_COLUMN: &str = "Nº Nota";

pub const REQUIRED_COLUMNS: [&str; 24] = [
    "Cód. Cliente",
    "Cliente",
    "Endereço",
    INVOICE_COLUMN,
    "Emissão",
    "Vencto",
    "Recebto",
    "Entregador",
    "Forma Pagto",
    "Valor Bruto",
    "Desc/Acrés",
    "Valor Líquido",
    "Atendente",
    "Carteira",
    "Canal Cliente",
    "Canal Venda",
    "Cidade",
    "Observação",
    "Hora Pedido",
    "Bairro",
    "Latitude",
    "Longitude",
    "Endereço Conclusão do Pedido",
    "Empresa",
];

/// Destination column holding invoice numbers.
pub fn key_column() -> String {
    normalize_label(INVOICE_COLUMN).into_owned()
}

/// Required labels absent from `columns`, in declared order.
pub fn missing_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c.as_ref() == **required))
        .map(|required| required.to_string())
        .collect()
}

pub fn validate(dataset: &Dataset) -> ImportResult<()> {
    let missing = missing_columns(dataset.columns());
    if missing.is_empty() {
        debug!(
            "Upload carries all {} required column(s) plus {} extra",
            REQUIRED_COLUMNS.len(),
            dataset.columns().len().saturating_sub(REQUIRED_COLUMNS.len())
        );
        Ok(())
    } else {
        debug!("Upload is missing {} required column(s)", missing.len());
        Err(ImportError::MissingColumns(missing))
    }
}
