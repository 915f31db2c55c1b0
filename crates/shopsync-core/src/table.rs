//! Tabular batches built from records, plus CSV import/export.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;
use serde_json::Value;
use thiserror::Error;

use crate::record::Record;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// A rectangular batch: ordered column names and one row of optional cells
/// per record. `None` marks a key the record did not carry (or a JSON null).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Builds a table whose columns are the union of record keys in
    /// first-appearance order.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for record in records {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| record.get(col).and_then(render_cell))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Reads a CSV file with a header row. Empty cells become `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Csv`] if the file cannot be opened or parsed.
    pub fn from_csv_path(path: &Path) -> Result<Self, ExportError> {
        let csv_err = |source| ExportError::Csv {
            path: path.display().to_string(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
        let columns = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_owned)
            .collect();

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row.map_err(csv_err)?;
            rows.push(
                row.iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_owned()))
                    .collect(),
            );
        }
        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Renders a JSON value as a CSV cell. Nested arrays/objects become JSON text.
fn render_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Writes `table` as UTF-8 CSV: header row, one row per record, no index column.
///
/// # Errors
///
/// Returns [`ExportError`] if the parent directory cannot be created or the
/// file cannot be written.
pub fn export_csv(table: &Table, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let csv_err = |source| ExportError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    if !table.columns.is_empty() {
        writer.write_record(&table.columns).map_err(csv_err)?;
    }
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = table.len(), "csv written");
    Ok(())
}

/// File name for an extract, e.g. `20250301_142500 shopify_orders.csv`.
#[must_use]
pub fn timestamped_file_name(at: NaiveDateTime, entity: &str) -> String {
    format!("{} shopify_{entity}.csv", at.format("%Y%m%d_%H%M%S"))
}
