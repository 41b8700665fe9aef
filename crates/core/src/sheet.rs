//! Spreadsheet store trait for the household's shared data.
//!
//! Every tab has a header row; data rows follow. Row and column addresses
//! are 1-based and header-relative, so the first data row is row 2.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A data row keyed by header.
pub type Record = Map<String, Value>;

/// The contents of one tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Normalise a header for matching: case-insensitive, spaces and
/// underscores treated alike.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

impl Sheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// 1-based column index of a header.
    pub fn column(&self, header: &str) -> Option<usize> {
        let wanted = normalize_header(header);
        self.headers
            .iter()
            .position(|h| normalize_header(h) == wanted)
            .map(|i| i + 1)
    }

    /// Cell of the `index`-th data row (0-based) under `header`.
    /// Short rows read as empty cells.
    pub fn cell(&self, index: usize, header: &str) -> Option<&str> {
        let col = self.column(header)?;
        let row = self.rows.get(index)?;
        Some(row.get(col - 1).map(String::as_str).unwrap_or(""))
    }

    /// Sheet row number of the `index`-th data row.
    pub fn sheet_row(index: usize) -> usize {
        index + 2
    }

    /// All data rows as header-keyed records, in sheet order.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| !h.is_empty())
                    .map(|(i, h)| {
                        let value = row.get(i).cloned().unwrap_or_default();
                        (h.clone(), Value::String(value))
                    })
                    .collect()
            })
            .collect()
    }
}

/// The spreadsheet collaborator the tools read and mutate.
///
/// No locking is implied: concurrent writers to the same cell race and
/// the last write wins.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read a whole tab, header row included.
    async fn read_all(&self, tab: &str) -> Result<Sheet, StoreError>;

    /// Overwrite one cell. `row` and `col` are 1-based.
    async fn write_cell(&self, tab: &str, row: usize, col: usize, value: &str)
    -> Result<(), StoreError>;

    /// Append a data row after the last one.
    async fn append_row(&self, tab: &str, values: Vec<String>) -> Result<(), StoreError>;
}
