//! Google Sheets REST v4 store.
//!
//! Talks to the `spreadsheets.values` endpoints with a bearer token:
//! - `GET    values/{range}` to read a whole tab
//! - `PUT    values/{range}?valueInputOption=USER_ENTERED` to overwrite a cell
//! - `POST   values/{range}:append?valueInputOption=USER_ENTERED` to add a row

use super::auth::SheetsAuth;
use async_trait::async_trait;
use homehub_core::error::StoreError;
use homehub_core::sheet::{Sheet, SheetStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

pub struct GoogleSheetsStore {
    base_url: String,
    spreadsheet_id: String,
    auth: SheetsAuth,
    client: reqwest::Client,
}

impl GoogleSheetsStore {
    /// A store using a fixed access token.
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_auth(spreadsheet_id, SheetsAuth::Static(access_token.into()))
    }

    pub fn with_auth(spreadsheet_id: impl Into<String>, auth: SheetsAuth) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            spreadsheet_id: spreadsheet_id.into(),
            auth,
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// URL of `values/{range}{suffix}` with the range percent-encoded as one
    /// path segment.
    fn values_url(&self, range: &str, suffix: &str) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| StoreError::Backend(format!("invalid Sheets base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Backend("Sheets base URL cannot hold a path".into()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values"])
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }

    async fn check(
        &self,
        tab: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.as_u16() == 401 {
            self.auth.invalidate().await;
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), tab, body = %body, "Sheets API error");

        if status.as_u16() == 400 && body.contains("Unable to parse range") {
            return Err(StoreError::TabNotFound(tab.to_string()));
        }
        Err(StoreError::Backend(format!(
            "Sheets API returned {}",
            status.as_u16()
        )))
    }
}

/// Quote a tab name for A1 notation: `'Weekly Meal Plan'`.
fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// Spreadsheet column letters for a 1-based index: 1 → A, 27 → AA.
pub fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// A1 reference of one cell in a tab.
pub fn a1_cell(tab: &str, row: usize, col: usize) -> String {
    format!("{}!{}{}", quote_tab(tab), column_letters(col), row)
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct ValueRangeBody<'a> {
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: Vec<Vec<&'a str>>,
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn read_all(&self, tab: &str) -> Result<Sheet, StoreError> {
        let url = self.values_url(&quote_tab(tab), "")?;
        debug!(tab, "Reading sheet");
        let token = self.auth.bearer().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let range: ValueRange = self.check(tab, response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Backend(format!("unreadable Sheets response: {e}")))?;

        let mut rows = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();
        Ok(Sheet::new(headers, rows.collect()))
    }

    async fn write_cell(
        &self,
        tab: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        if row == 0 {
            return Err(StoreError::RowOutOfRange {
                tab: tab.to_string(),
                row,
            });
        }
        if col == 0 {
            return Err(StoreError::ColumnNotFound {
                tab: tab.to_string(),
                column: "0".into(),
            });
        }

        let range = a1_cell(tab, row, col);
        let url = self.values_url(&range, "")?;
        debug!(tab, range = %range, "Writing cell");
        let token = self.auth.bearer().await?;

        let response = self
            .client
            .put(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(&token)
            .json(&ValueRangeBody {
                major_dimension: "ROWS",
                values: vec![vec![value]],
            })
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.check(tab, response).await?;
        Ok(())
    }

    async fn append_row(&self, tab: &str, values: Vec<String>) -> Result<(), StoreError> {
        let url = self.values_url(&quote_tab(tab), ":append")?;
        debug!(tab, cells = values.len(), "Appending row");
        let token = self.auth.bearer().await?;

        let response = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&token)
            .json(&ValueRangeBody {
                major_dimension: "ROWS",
                values: vec![values.iter().map(String::as_str).collect()],
            })
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.check(tab, response).await?;
        Ok(())
    }
}
