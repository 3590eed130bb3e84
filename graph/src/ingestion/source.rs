use germplasm_models::{Properties, SkipReason, SkippedRow};
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::GraphResult;

const BOM: char = '\u{feff}';

/// Parsed crawler export. Rows carry their data-row index in the file.
#[derive(Debug, Default)]
pub struct SourceTable {
    pub rows: Vec<(usize, Properties)>,
    /// Lines that could not be turned into a record
    pub malformed: Vec<SkippedRow>,
}

impl SourceTable {
    pub fn len(&self) -> usize {
        self.rows.len() + self.malformed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read a crawler export from disk
pub fn read_csv_path(path: impl AsRef<Path>) -> GraphResult<SourceTable> {
    let path = path.as_ref();
    tracing::info!("📄 Reading source table {}", path.display());
    read_csv(File::open(path)?)
}

/// Parse a CSV table with a header row into flat records.
///
/// Empty cells become `null` (absent); every other cell is kept as a string.
/// A line with the wrong field count or invalid UTF-8 is reported in
/// `malformed` and reading continues. Unreadable headers and I/O failures
/// abort.
pub fn read_csv<R: Read>(reader: R) -> GraphResult<SourceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(BOM).trim().to_string())
        .collect();

    let mut table = SourceTable::default();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) if record.len() == headers.len() => record,
            Ok(record) => {
                table.malformed.push(malformed(
                    row,
                    format!("expected {} fields, found {}", headers.len(), record.len()),
                ));
                continue;
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                table.malformed.push(malformed(row, e.to_string()));
                continue;
            }
        };

        let mut properties = Properties::new();
        for (column, cell) in headers.iter().zip(record.iter()) {
            let value = if cell.is_empty() {
                Value::Null
            } else {
                Value::String(cell.to_string())
            };
            properties.insert(column.clone(), value);
        }
        table.rows.push((row, properties));
    }

    tracing::debug!(
        rows = table.rows.len(),
        malformed = table.malformed.len(),
        columns = headers.len(),
        "Source table parsed"
    );
    Ok(table)
}

fn malformed(row: usize, detail: String) -> SkippedRow {
    tracing::warn!(row, detail = %detail, "⚠️ Skipping malformed source line");
    SkippedRow {
        row,
        wheat_key: None,
        reason: SkipReason::MalformedRow { detail },
    }
}
