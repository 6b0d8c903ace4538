use csv::{ReaderBuilder, Trim};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{IntakeError, Result};

/// One data row keyed by source column name.
/// A column is absent when the row was shorter than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    cells: BTreeMap<String, String>,
}

impl SourceRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.cells.insert(column.to_string(), value.to_string());
        self
    }

    /// Cell value for `column`, `None` when the column is absent
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Cell value for `column`, empty when absent
    pub fn get_or_empty(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().to_string()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SourceRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A parsed upload: the header row plus every data row in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

/// Parse comma-delimited UTF-8 bytes with a header row.
///
/// Header names and cell values are trimmed; a leading byte-order mark is dropped.
pub fn read_source_table(bytes: &[u8]) -> Result<SourceTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IntakeError::Format(format!("unreadable header row: {}", e)))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(IntakeError::Format("file has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| IntakeError::Format(format!("row {}: {}", index + 1, e)))?;
        let mut cells = BTreeMap::new();
        for (column, value) in headers.iter().zip(record.iter()) {
            if column.is_empty() {
                continue;
            }
            // First occurrence wins for duplicated header names
            cells
                .entry(column.clone())
                .or_insert_with(|| value.to_string());
        }
        rows.push(SourceRow { cells });
    }

    debug!("Read {} rows with {} columns", rows.len(), headers.len());
    Ok(SourceTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_trimmed_cells() {
        let csv = "First Name, Last Name ,Email\n Ana ,Diaz,a@x.com\n";
        let table = read_source_table(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["First Name", "Last Name", "Email"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("First Name"), Some("Ana"));
        assert_eq!(table.rows[0].get("Last Name"), Some("Diaz"));
    }

    #[test]
    fn short_rows_leave_trailing_columns_absent() {
        let csv = "First Name,Last Name,Email\nAna,Diaz\n";
        let table = read_source_table(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].get("Email"), None);
        assert_eq!(table.rows[0].get_or_empty("Email"), "");
    }

    #[test]
    fn quoted_cells_keep_embedded_commas() {
        let csv = "First Name,Location\nAna,\"Berlin, Germany\"\n";
        let table = read_source_table(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].get("Location"), Some("Berlin, Germany"));
    }

    #[test]
    fn byte_order_mark_is_stripped_from_first_header() {
        let csv = "\u{feff}First Name,Email\nAna,a@x.com\n";
        let table = read_source_table(csv.as_bytes()).unwrap();
        assert!(table.has_column("First Name"));
    }

    #[test]
    fn empty_input_is_a_format_error() {
        let err = read_source_table(b"").unwrap_err();
        assert!(matches!(err, IntakeError::Format(_)));
    }

    #[test]
    fn invalid_utf8_is_a_format_error() {
        let bytes = b"First Name,Email\n\xff\xfe,a@x.com\n";
        let err = read_source_table(bytes).unwrap_err();
        assert!(matches!(err, IntakeError::Format(_)));
    }
}
