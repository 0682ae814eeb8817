//! Google Sheets REST client
//!
//! Read-only client for the Sheets v4 API using an API key. Covers the two
//! operations the pipeline needs: listing tab titles and fetching a cell
//! range as text rows.

use crate::config::SheetsConfig;
use crate::error::{RatinglensError, Result};
use crate::sheets::SheetsApi;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Base URL of the Sheets v4 REST API
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Maximum retry attempts for transient failures
const MAX_RETRIES: usize = 1;

/// Backoff duration before a retry, in milliseconds
const BACKOFF_MS: u64 = 1000;

/// Google Sheets API client
pub struct GoogleSheetsClient {
    client: Client,
    sheet_id: String,
    api_key: String,
    base_url: String,
}

/// Spreadsheet metadata response (tab listing)
#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Cell range response. Google omits `values` entirely for an empty range,
/// and individual cells may arrive as JSON numbers or bools rather than
/// strings.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Render one cell to text. Null stands for an empty cell; numeric and
/// boolean cells keep their JSON rendering.
fn render_cell(cell: Value) -> String {
    match cell {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl GoogleSheetsClient {
    /// Create a new Sheets client from configuration
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RatinglensError::Fetch(e.to_string()))?;

        Ok(Self {
            client,
            sheet_id: config.sheet_id.clone(),
            api_key: config.api_key.clone(),
            base_url: SHEETS_API_BASE.to_string(),
        })
    }

    /// Issue a GET against the Sheets API and decode the JSON body, with at
    /// most one retry on a transient failure.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T> {
        let mut retries = 0;

        loop {
            match self.get_json_once(&url).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if retries >= MAX_RETRIES || !is_transient(&e) {
                        return Err(e);
                    }

                    warn!(
                        "Sheets API call failed, retrying after {}ms: {}",
                        BACKOFF_MS, e
                    );
                    sleep(Duration::from_millis(BACKOFF_MS)).await;
                    retries += 1;
                }
            }
        }
    }

    /// Issue a GET once (no retry)
    async fn get_json_once<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();

        match status {
            StatusCode::OK => {
                let body = response
                    .json::<T>()
                    .await
                    .map_err(|e| RatinglensError::Fetch(format!("Invalid Sheets response: {}", e)))?;
                Ok(body)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RatinglensError::Fetch(
                "Sheets API authentication failed, check GOOGLE_SHEETS_API_KEY".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(RatinglensError::Fetch(
                "Spreadsheet or tab not found, check GOOGLE_SHEET_ID".to_string(),
            )),
            StatusCode::TOO_MANY_REQUESTS => Err(RatinglensError::Fetch(
                "Sheets API rate limit exceeded".to_string(),
            )),
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                Err(RatinglensError::Fetch(format!(
                    "Sheets API error (status {}): {}",
                    status, error_text
                )))
            }
        }
    }
}

/// Whether an error is worth a single retry
fn is_transient(error: &RatinglensError) -> bool {
    match error {
        RatinglensError::Http(e) => e.is_timeout() || e.is_connect(),
        RatinglensError::Fetch(msg) => msg.contains("rate limit"),
        _ => false,
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn tab_titles(&self) -> Result<Vec<String>> {
        debug!("Listing tabs for spreadsheet {}", self.sheet_id);

        let url = format!(
            "{}/{}?fields=sheets.properties.title",
            self.base_url, self.sheet_id
        );
        let meta: SpreadsheetMeta = self.get_json(url).await?;

        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    async fn values(&self, tab: &str, range: &str) -> Result<Vec<Vec<String>>> {
        debug!("Fetching range {} from tab {}", range, tab);

        let url = format!("{}/{}/values/{}!{}", self.base_url, self.sheet_id, tab, range);
        let value_range: ValueRange = self.get_json(url).await?;

        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(render_cell).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SheetsConfig {
        SheetsConfig {
            sheet_id: "sheet-123".to_string(),
            api_key: "key-456".to_string(),
            tab_keyword: "Poll".to_string(),
            default_tab: "Sheet1".to_string(),
            cell_range: "A1:P1000".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_client_creation() {
        assert!(GoogleSheetsClient::new(&test_config()).is_ok());

        let mut config = test_config();
        config.api_key = String::new();
        assert!(GoogleSheetsClient::new(&config).is_err());
    }

    #[test]
    fn test_parse_spreadsheet_meta() {
        let json = r#"{"sheets":[{"properties":{"title":"Live Class Poll"}},{"properties":{"title":"Sheet1"}}]}"#;
        let meta: SpreadsheetMeta = serde_json::from_str(json).unwrap();
        let titles: Vec<String> = meta.sheets.into_iter().map(|s| s.properties.title).collect();
        assert_eq!(titles, vec!["Live Class Poll", "Sheet1"]);
    }

    #[test]
    fn test_parse_value_range_without_values() {
        // An empty range omits the values key entirely
        let json = r#"{"range":"Sheet1!A1:P1000","majorDimension":"ROWS"}"#;
        let range: ValueRange = serde_json::from_str(json).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_non_string_cells_render_as_text() {
        let json = r#"{"values":[["Instructor","Overall Average Rating"],["John",4.5],["Jane",true],["Priya",null]]}"#;
        let range: ValueRange = serde_json::from_str(json).unwrap();
        let rows: Vec<Vec<String>> = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(render_cell).collect())
            .collect();

        assert_eq!(rows[0], vec!["Instructor", "Overall Average Rating"]);
        assert_eq!(rows[1], vec!["John", "4.5"]);
        assert_eq!(rows[2], vec!["Jane", "true"]);
        assert_eq!(rows[3], vec!["Priya", ""]);
    }

    #[test]
    fn test_is_transient() {
        assert!(is_transient(&RatinglensError::Fetch(
            "Sheets API rate limit exceeded".to_string()
        )));
        assert!(!is_transient(&RatinglensError::Fetch(
            "Spreadsheet or tab not found, check GOOGLE_SHEET_ID".to_string()
        )));
        assert!(!is_transient(&RatinglensError::Schema(
            "missing column".to_string()
        )));
    }
}
