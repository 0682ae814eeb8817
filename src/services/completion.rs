//! Completion-backed query analysis
//!
//! Builds a focused prompt around the relevant record subset and asks an
//! OpenAI-compatible chat completion endpoint for the answer. The prompt
//! carries the dataset vocabularies and counts so the model can ground its
//! statistics without seeing the full sheet.

use crate::analysis::serialize::to_delimited_text;
use crate::config::CompletionConfig;
use crate::error::{RatinglensError, Result};
use crate::services::CompletionApi;
use crate::types::Record;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Fixed system instruction sent with every analysis request
const SYSTEM_INSTRUCTION: &str = "You are a precise data analyst. Answer the query using ONLY the data provided, showing all relevant statistics including session counts, ratings, and other metrics.";

/// Maximum retry attempts for transient failures
const MAX_RETRIES: usize = 1;

/// Backoff duration before a retry, in milliseconds
const BACKOFF_MS: u64 = 1000;

/// Chat completion API request format
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completion API response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// OpenAI-compatible chat completion client
pub struct OpenAiClient {
    client: Client,
    config: CompletionConfig,
}

impl OpenAiClient {
    /// Create a new completion client.
    ///
    /// An empty API key is allowed; calls will fail with an authentication
    /// error and the pipeline falls back to local analysis.
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RatinglensError::Completion(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Call the completion endpoint with at most one retry on a transient
    /// failure.
    async fn call_with_retry(&self, request: &ChatRequest) -> Result<String> {
        let mut retries = 0;

        loop {
            match self.call_once(request).await {
                Ok(answer) => return Ok(answer),
                Err(e) => {
                    if retries >= MAX_RETRIES || !is_transient(&e) {
                        return Err(e);
                    }

                    warn!(
                        "Completion call failed, retrying after {}ms: {}",
                        BACKOFF_MS, e
                    );
                    sleep(Duration::from_millis(BACKOFF_MS)).await;
                    retries += 1;
                }
            }
        }
    }

    /// Call the completion endpoint once (no retry)
    async fn call_once(&self, request: &ChatRequest) -> Result<String> {
        debug!("Calling completion API, model {}", self.config.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();

        match status {
            StatusCode::OK => {
                let body: ChatResponse = response.json().await.map_err(|e| {
                    RatinglensError::Completion(format!("Failed to parse response: {}", e))
                })?;

                body.choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .ok_or_else(|| {
                        RatinglensError::Completion(
                            "Empty response from completion API".to_string(),
                        )
                    })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RatinglensError::Completion(
                "Completion API authentication failed, check OPENAI_API_KEY".to_string(),
            )),
            StatusCode::TOO_MANY_REQUESTS => Err(RatinglensError::Completion(
                "Completion API rate limit exceeded".to_string(),
            )),
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                Err(RatinglensError::Completion(format!(
                    "Completion API error (status {}): {}",
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
        RatinglensError::Completion(msg) => msg.contains("rate limit"),
        _ => false,
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        self.call_with_retry(&request).await
    }
}

/// Analyzer delegating to a completion service
pub struct CompletionAnalyzer {
    api: Arc<dyn CompletionApi>,
}

impl CompletionAnalyzer {
    /// Create an analyzer over any completion client
    pub fn new(api: Arc<dyn CompletionApi>) -> Self {
        Self { api }
    }

    /// Answer a query from the relevant subset.
    ///
    /// Serializes the subset, wraps it in a focused prompt with the dataset
    /// vocabularies and counts, and returns the trimmed answer verbatim.
    /// The answer's numeric claims are not validated here.
    pub async fn analyze(
        &self,
        query: &str,
        total_records: usize,
        headers: &[String],
        subset: &[&Record],
        instructors: &[&str],
        domains: &[&str],
    ) -> Result<String> {
        let csv = to_delimited_text(headers, subset);
        let prompt = build_prompt(query, total_records, subset.len(), instructors, domains, &csv);

        info!(
            "Sending focused data ({} rows) to the completion service",
            subset.len()
        );

        let answer = self.api.complete(SYSTEM_INSTRUCTION, &prompt).await?;
        Ok(answer.trim().to_string())
    }
}

/// Build the focused analysis prompt
fn build_prompt(
    query: &str,
    total_records: usize,
    relevant_records: usize,
    instructors: &[&str],
    domains: &[&str],
    csv: &str,
) -> String {
    format!(
        r#"
You are analyzing data from a session ratings sheet. The full dataset has {total} rows, but I'm providing you with {relevant} rows that are most relevant to the query.

User query: "{query}"

Dataset information:
- Available instructors: {instructors}
- Available domains: {domains}
- Selected rows: {relevant} out of {total} total

Here is the CSV data of the relevant rows:

{csv}

Please analyze this data to answer the query, focusing on:
1. Accurate counts of sessions
2. Precise calculation of average ratings
3. All available information for the instructor(s) or domain(s) mentioned
4. Clear presentation of results with all relevant details

Your answer should be comprehensive and include ALL statistics that can be derived from the data, especially ratings when available.
"#,
        total = total_records,
        relevant = relevant_records,
        query = query,
        instructors = instructors.join(", "),
        domains = domains.join(", "),
        csv = csv,
    )
}
