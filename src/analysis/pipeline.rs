//! End-to-end query pipeline
//!
//! Sequences fetch, structuring, relevance filtering, and analysis for one
//! query, converting every failure into a structured outcome. Completion
//! failures are absorbed by the local fallback; fetch and schema failures
//! terminate the request before any analysis runs.
//!
//! Every run re-fetches the sheet and owns its record set end to end, so
//! concurrent queries share no mutable state.

use crate::analysis::{fallback, relevance};
use crate::config::Settings;
use crate::error::Result;
use crate::services::{CompletionAnalyzer, OpenAiClient};
use crate::sheets::{structure, GoogleSheetsClient, SheetSource};
use crate::types::{AnalysisOutcome, COL_DOMAIN, COL_INSTRUCTOR};
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrator owning the pipeline components for the analyze operation
pub struct Orchestrator {
    source: SheetSource,
    analyzer: CompletionAnalyzer,
}

impl Orchestrator {
    /// Create an orchestrator from its two injected components
    pub fn new(source: SheetSource, analyzer: CompletionAnalyzer) -> Self {
        Self { source, analyzer }
    }

    /// Wire the production pipeline from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let sheets = GoogleSheetsClient::new(&settings.sheets)?;
        let source = SheetSource::new(Arc::new(sheets), settings.sheets.clone());
        let completion = OpenAiClient::new(settings.completion.clone())?;
        let analyzer = CompletionAnalyzer::new(Arc::new(completion));

        Ok(Self::new(source, analyzer))
    }

    /// Run one query end to end. Never panics and never returns an
    /// unstructured error; the caller always gets a terminal outcome.
    pub async fn analyze_query(&self, query: &str) -> AnalysisOutcome {
        info!("Analyzing query: {}", query);

        match self.run(query).await {
            Ok(answer) => AnalysisOutcome::Answer(answer),
            Err(e) => {
                warn!("Query failed before analysis: {}", e);
                AnalysisOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run(&self, query: &str) -> Result<String> {
        let sheet = self.source.fetch().await?;
        let records = structure(&sheet)?;
        let headers = sheet.headers().to_vec();

        let subset = relevance::filter(query, &records);
        let instructors = relevance::vocabulary(&records, COL_INSTRUCTOR);
        let domains = relevance::vocabulary(&records, COL_DOMAIN);

        let answer = match self
            .analyzer
            .analyze(
                query,
                records.len(),
                &headers,
                &subset,
                &instructors,
                &domains,
            )
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Completion analysis failed, using local fallback: {}", e);
                fallback::analyze_locally(query, &records)
            }
        };

        Ok(answer)
    }
}
