//! Spreadsheet access layer for ratinglens
//!
//! Provides the client abstraction for the spreadsheet service, the data
//! source that selects a tab and fetches the raw sheet, and the structurer
//! that turns raw rows into header-keyed records.

pub mod google;
pub mod source;
pub mod structure;

use crate::error::Result;
use async_trait::async_trait;

pub use google::GoogleSheetsClient;
pub use source::{select_tab, SheetSource};
pub use structure::{structure, validate_headers};

/// Spreadsheet service trait defining the read operations the pipeline needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// List tab titles in the order the service reports them
    async fn tab_titles(&self) -> Result<Vec<String>>;

    /// Fetch a cell range from a named tab as ordered rows of text cells
    async fn values(&self, tab: &str, range: &str) -> Result<Vec<Vec<String>>>;
}
