//! Remedy Table
//!
//! Read-only relation of condition name → treatment text, loaded once from a
//! CSV file. Blank rows are dropped on load; lookups on the condition key are
//! case-insensitive and the first row wins when a condition repeats.

use serde::Serialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Default header of the condition column
pub const DEFAULT_CONDITION_COLUMN: &str = "Disease";

/// Default header of the treatment column
pub const DEFAULT_TREATMENT_COLUMN: &str = "Treatment";

/// Remedy table errors
#[derive(Debug, Error)]
pub enum RemedyTableError {
    #[error("Failed to read remedy table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse remedy table: {0}")]
    Csv(#[from] csv::Error),
    #[error("Remedy table has no '{0}' column")]
    MissingColumn(String),
}

/// One condition → treatment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemedyRecord {
    pub condition: String,
    pub treatment: String,
}

impl RemedyRecord {
    pub fn new(condition: impl Into<String>, treatment: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            treatment: treatment.into(),
        }
    }
}

/// Header names locating the two columns of interest
#[derive(Debug, Clone)]
pub struct RemedyColumns {
    pub condition: String,
    pub treatment: String,
}

impl Default for RemedyColumns {
    fn default() -> Self {
        Self {
            condition: DEFAULT_CONDITION_COLUMN.to_string(),
            treatment: DEFAULT_TREATMENT_COLUMN.to_string(),
        }
    }
}

/// Immutable remedy relation
#[derive(Debug, Clone, Default)]
pub struct RemedyTable {
    records: Vec<RemedyRecord>,
    /// Distinct condition keys in first-occurrence order
    keys: Vec<String>,
}

impl RemedyTable {
    /// Build from records, dropping blank ones
    pub fn from_records(records: impl IntoIterator<Item = RemedyRecord>) -> Self {
        let mut kept = Vec::new();
        let mut keys: Vec<String> = Vec::new();

        for record in records {
            let condition = record.condition.trim();
            let treatment = record.treatment.trim();
            if condition.is_empty() || treatment.is_empty() {
                tracing::warn!(
                    condition = %record.condition,
                    "dropping remedy row with blank condition or treatment"
                );
                continue;
            }

            if !keys.iter().any(|k| same_key(k, condition)) {
                keys.push(condition.to_string());
            }
            kept.push(RemedyRecord::new(condition, treatment));
        }

        Self {
            records: kept,
            keys,
        }
    }

    /// Load from a CSV file with the default column names
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RemedyTableError> {
        Self::load_with_columns(path, &RemedyColumns::default())
    }

    pub fn load_with_columns(
        path: impl AsRef<Path>,
        columns: &RemedyColumns,
    ) -> Result<Self, RemedyTableError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, columns)
    }

    /// Parse CSV from any reader
    pub fn from_reader<R: Read>(
        reader: R,
        columns: &RemedyColumns,
    ) -> Result<Self, RemedyTableError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = reader.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| RemedyTableError::MissingColumn(name.to_string()))
        };
        let condition_idx = find(&columns.condition)?;
        let treatment_idx = find(&columns.treatment)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(RemedyRecord::new(
                row.get(condition_idx).unwrap_or_default(),
                row.get(treatment_idx).unwrap_or_default(),
            ));
        }

        let table = Self::from_records(records);
        tracing::info!(
            rows = table.len(),
            conditions = table.keys.len(),
            "remedy table loaded"
        );
        Ok(table)
    }

    /// Exact, case-insensitive treatment lookup; first matching row wins
    pub fn treatment_for(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        self.records
            .iter()
            .find(|r| same_key(&r.condition, key))
            .map(|r| r.treatment.as_str())
    }

    /// Distinct condition keys in table order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn records(&self) -> &[RemedyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn same_key(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
