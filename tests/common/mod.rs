//! Common test utilities and helpers

use async_trait::async_trait;
use ratinglens_core::analysis::Orchestrator;
use ratinglens_core::config::SheetsConfig;
use ratinglens_core::error::{RatinglensError, Result};
use ratinglens_core::services::{CompletionAnalyzer, CompletionApi};
use ratinglens_core::sheets::{SheetSource, SheetsApi};
use std::sync::{Arc, Mutex};

/// Build a fixture sheet with the production header row and a small but
/// realistic spread of instructors, domains, and ratings
pub fn fixture_rows() -> Vec<Vec<String>> {
    let raw = vec![
        vec![
            "Instructor",
            "Domain",
            "Topic Code",
            "Session Date",
            "Overall Average Rating",
            "Cohorts",
        ],
        vec![
            "John Doe",
            "Backend",
            "BE-101",
            "2024-01-15",
            "4.5",
            "C42, C43",
        ],
        vec!["John Doe", "Frontend", "FE-201", "2024-02-03", "3.5", "C42"],
        vec![
            "Jane Smith",
            "Backend",
            "BE-102",
            "2024-01-22",
            "4.0",
            "C44",
        ],
        vec![
            "Jane Smith",
            "Fullstack",
            "FS-301",
            "2024-03-10",
            "4.8",
            "",
        ],
        vec![
            "Priya Patel",
            "Backend",
            "BE-103",
            "2024-02-17",
            "N/A",
            "C45",
        ],
    ];

    raw.into_iter()
        .map(|row| row.into_iter().map(String::from).collect())
        .collect()
}

/// Sheets service stub serving fixed tabs and rows.
///
/// Records the tab requested for each values call so tests can assert the
/// tab selection policy end to end.
pub struct StaticSheets {
    titles: Vec<String>,
    rows: Vec<Vec<String>>,
    requested_tabs: Mutex<Vec<String>>,
}

impl StaticSheets {
    pub fn new(titles: Vec<&str>, rows: Vec<Vec<String>>) -> Self {
        Self {
            titles: titles.into_iter().map(String::from).collect(),
            rows,
            requested_tabs: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_tabs(&self) -> Vec<String> {
        self.requested_tabs.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetsApi for StaticSheets {
    async fn tab_titles(&self) -> Result<Vec<String>> {
        Ok(self.titles.clone())
    }

    async fn values(&self, tab: &str, _range: &str) -> Result<Vec<Vec<String>>> {
        self.requested_tabs.lock().unwrap().push(tab.to_string());
        Ok(self.rows.clone())
    }
}

/// Completion service stub with a scripted reply.
///
/// Records every prompt so tests can assert what context the pipeline
/// actually sent.
pub struct ScriptedCompletion {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn answering(answer: &str) -> Self {
        Self {
            reply: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionApi for ScriptedCompletion {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(answer) => Ok(answer.clone()),
            Err(message) => Err(RatinglensError::Completion(message.clone())),
        }
    }
}

/// Sheets configuration with fixed values, independent of the environment
pub fn test_sheets_config() -> SheetsConfig {
    SheetsConfig {
        sheet_id: "sheet-test".to_string(),
        api_key: "key-test".to_string(),
        tab_keyword: "Poll".to_string(),
        default_tab: "Sheet1".to_string(),
        cell_range: "A1:P1000".to_string(),
        timeout_secs: 30,
    }
}

/// Wire an orchestrator over the two stubs
pub fn build_orchestrator(
    sheets: Arc<StaticSheets>,
    completion: Arc<ScriptedCompletion>,
) -> Orchestrator {
    Orchestrator::new(
        SheetSource::new(sheets, test_sheets_config()),
        CompletionAnalyzer::new(completion),
    )
}
