//! Sheet data source
//!
//! Selects the target tab and fetches the raw sheet for one pipeline run.
//! Nothing is cached; every query re-fetches the sheet.

use crate::config::SheetsConfig;
use crate::error::{RatinglensError, Result};
use crate::sheets::SheetsApi;
use crate::types::RawSheet;
use std::sync::Arc;
use tracing::{debug, info};

/// Data source combining a sheets client with tab selection policy
pub struct SheetSource {
    api: Arc<dyn SheetsApi>,
    config: SheetsConfig,
}

impl SheetSource {
    /// Create a data source over any sheets client
    pub fn new(api: Arc<dyn SheetsApi>, config: SheetsConfig) -> Self {
        Self { api, config }
    }

    /// Fetch the raw sheet for the configured spreadsheet.
    ///
    /// Lists tabs, picks one by the keyword policy, then pulls the
    /// configured cell range. Fails when the chosen tab has no rows.
    pub async fn fetch(&self) -> Result<RawSheet> {
        let titles = self.api.tab_titles().await?;
        debug!("Available tabs: {:?}", titles);

        let tab = select_tab(&titles, &self.config.tab_keyword, &self.config.default_tab);
        debug!("Using tab: {}", tab);

        let rows = self.api.values(&tab, &self.config.cell_range).await?;
        if rows.is_empty() {
            return Err(RatinglensError::Fetch(
                "No data found in the spreadsheet".to_string(),
            ));
        }

        info!("Fetched {} rows from tab {}", rows.len(), tab);

        Ok(RawSheet {
            sheet_name: tab,
            rows,
        })
    }
}

/// Pick the tab to read: the first title containing the keyword
/// (case-sensitive), in reported order, or the default tab when none match.
pub fn select_tab(titles: &[String], keyword: &str, default_tab: &str) -> String {
    titles
        .iter()
        .find(|title| title.contains(keyword))
        .cloned()
        .unwrap_or_else(|| default_tab.to_string())
}
