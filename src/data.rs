use chrono::{NaiveDateTime, NaiveTime};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// A single decoded spreadsheet cell. Empty cells are `None` at the row level.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl Value {
    /// Text rendering shared by key comparison, previews and CSV export.
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Boolean(b) => b.to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Value::Time(t) => t.format(TIME_FORMAT).to_string(),
        }
    }

    pub fn affinity(&self) -> Affinity {
        match self {
            Value::Integer(_) | Value::Boolean(_) => Affinity::Integer,
            Value::Float(_) => Affinity::Real,
            Value::String(_) | Value::DateTime(_) | Value::Time(_) => Affinity::Text,
        }
    }
}

/// Integral floats render without a fractional part so that `100` and `100.0`
/// compare equal as keys.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

pub fn display_cell(cell: Option<&Value>) -> String {
    cell.map(Value::as_display).unwrap_or_default()
}

/// Storage class used when a destination table is created from an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Integer,
    Real,
    Text,
}

impl Affinity {
    pub fn as_sql(self) -> &'static str {
        match self {
            Affinity::Integer => "INTEGER",
            Affinity::Real => "REAL",
            Affinity::Text => "TEXT",
        }
    }

    /// Widens two observed affinities: integers promote to real, anything
    /// mixed with text becomes text.
    pub fn merge(self, other: Affinity) -> Affinity {
        match (self, other) {
            (Affinity::Text, _) | (_, Affinity::Text) => Affinity::Text,
            (Affinity::Real, _) | (_, Affinity::Real) => Affinity::Real,
            _ => Affinity::Integer,
        }
    }

    /// Affinity for a column of cells; all-null columns default to text.
    pub fn infer<'a, I>(cells: I) -> Affinity
    where
        I: IntoIterator<Item = Option<&'a Value>>,
    {
        cells
            .into_iter()
            .flatten()
            .map(Value::affinity)
            .reduce(Affinity::merge)
            .unwrap_or(Affinity::Text)
    }
}
