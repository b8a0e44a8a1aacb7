//! In-memory representation of one row of billing data.

use std::collections::BTreeMap;
use std::fmt;

/// A single scalar read from the input table.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Free text, exactly as it appeared in the source.
    Text(String),
    /// A numeric cell. Spreadsheet dates arrive here as serial day counts.
    Number(f64),
    /// Missing column or empty cell.
    #[default]
    Absent,
}

static ABSENT: Value = Value::Absent;

impl Value {
    /// Builds a value from raw cell text, mapping blank text to [`Value::Absent`].
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::Absent
        } else {
            Self::Text(text)
        }
    }

    /// Returns true for absent values and blank text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(value) => value.is_nan(),
        }
    }

    /// Returns the display form used when the value is printed as plain text.
    ///
    /// Integral numbers lose their trailing `.0` so that account numbers read
    /// from a spreadsheet print the way they were typed.
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_owned(),
            Self::Number(value) => format_number(*value),
            Self::Absent => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::from_text(text)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// One row of the input table, keyed by column name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    row: usize,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record for the given 1-based source row.
    pub fn new(row: usize) -> Self {
        Self {
            row,
            fields: BTreeMap::new(),
        }
    }

    /// Builds a record from `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(row: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self::new(row);
        for (name, value) in pairs {
            record.fields.insert(name.into(), value.into());
        }
        record
    }

    /// Sets a field and returns the updated record.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the 1-based row number of the record in its source table.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the value stored under `name`, or [`Value::Absent`] when the column is missing.
    pub fn get(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&ABSENT)
    }

    /// Returns the trimmed display text of a field.
    pub fn text(&self, name: &str) -> String {
        self.get(name).display()
    }

    /// Iterates over all stored fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns true when every field is blank.
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(Value::is_blank)
    }

    /// Joins the non-blank display values of `names` with single spaces.
    ///
    /// Used for derived fields such as `City State Zip`.
    pub fn joined(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|name| self.text(name))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
