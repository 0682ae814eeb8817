//! Runtime configuration for ratinglens
//!
//! All settings come from environment variables with sensible defaults, so a
//! deployment only has to provide credentials. Numeric overrides that fail to
//! parse fall back to the default rather than aborting startup.

use crate::error::{RatinglensError, Result};
use std::env;
use tracing::warn;

/// Configuration for the Google Sheets data source
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Spreadsheet identifier (the long ID from the sheet URL)
    pub sheet_id: String,

    /// API key used for the Sheets REST API
    pub api_key: String,

    /// Tab is preferred when its name contains this keyword
    pub tab_keyword: String,

    /// Tab used when no tab name matches the keyword
    pub default_tab: String,

    /// Cell range fetched from the chosen tab
    pub cell_range: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            sheet_id: env::var("GOOGLE_SHEET_ID").unwrap_or_default(),
            api_key: env::var("GOOGLE_SHEETS_API_KEY").unwrap_or_default(),
            tab_keyword: env::var("RATINGLENS_TAB_KEYWORD")
                .unwrap_or_else(|_| "Poll".to_string()),
            default_tab: env::var("RATINGLENS_DEFAULT_TAB")
                .unwrap_or_else(|_| "Sheet1".to_string()),
            cell_range: env::var("RATINGLENS_CELL_RANGE")
                .unwrap_or_else(|_| "A1:P1000".to_string()),
            timeout_secs: env_u64("RATINGLENS_SHEETS_TIMEOUT_SECS", 30),
        }
    }
}

impl SheetsConfig {
    /// Check that the credentials needed to reach the sheet are present.
    pub fn validate(&self) -> Result<()> {
        if self.sheet_id.is_empty() {
            return Err(RatinglensError::Config(config::ConfigError::Message(
                "GOOGLE_SHEET_ID is not set".to_string(),
            )));
        }
        if self.api_key.is_empty() {
            return Err(RatinglensError::Config(config::ConfigError::Message(
                "GOOGLE_SHEETS_API_KEY is not set".to_string(),
            )));
        }
        Ok(())
    }
}

/// Configuration for the completion (language model) service
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// API key for the completion endpoint
    pub api_key: String,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Model identifier sent with each request
    pub model: String,

    /// Maximum answer length in tokens
    pub max_tokens: u32,

    /// Sampling temperature; low for factual analysis
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("RATINGLENS_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            max_tokens: env_u64("RATINGLENS_MAX_TOKENS", 2048) as u32,
            temperature: env_f32("RATINGLENS_TEMPERATURE", 0.1),
            timeout_secs: env_u64("RATINGLENS_COMPLETION_TIMEOUT_SECS", 30),
        }
    }
}

impl CompletionConfig {
    /// Whether a completion key is available. The pipeline still works
    /// without one; every query is answered by the local fallback.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Aggregated settings for the whole service
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub sheets: SheetsConfig,
    pub completion: CompletionConfig,
}

impl Settings {
    /// Load settings from the environment.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Validate settings for server startup. Sheet credentials are
    /// mandatory; a missing completion key only degrades answers to the
    /// local fallback, so it logs a warning instead of failing.
    pub fn validate(&self) -> Result<()> {
        self.sheets.validate()?;
        if !self.completion.is_configured() {
            warn!("OPENAI_API_KEY is not set, all answers will use the local fallback analyzer");
        }
        Ok(())
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
