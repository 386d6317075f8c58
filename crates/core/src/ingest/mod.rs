pub mod broker;
pub mod generic;

use crate::errors::CoreError;

/// Upper bound on the header-row scan for broker exports. Malformed files
/// without a recognizable header fail fast instead of being scanned in full.
pub const HEADER_SCAN_LIMIT: usize = 50;

/// A raw tabular export, normalized to rows of string cells.
///
/// CSV bytes are decoded here with the `csv` crate; spreadsheet formats
/// (XLSX) are decoded by the host, which passes the resulting grid through
/// `from_rows`. The table is parsed once into holdings and then dropped —
/// the raw file is never retained.
#[derive(Debug, Clone)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Decode CSV bytes without assuming a header row: broker exports bury
    /// the header under metadata rows, so every row is read as data and the
    /// header is located afterwards.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { rows })
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse a numeric cell, tolerating thousands separators ("1,234.50").
pub(crate) fn parse_number(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
