//! Connectivity diagnostics for ratinglens
//!
//! Verifies a deployment the way an operator would: environment variables,
//! spreadsheet access, tab selection, sample data access, and the header
//! schema. The report can be saved as JSON for support escalation.

use crate::config::Settings;
use crate::error::Result;
use crate::sheets::{select_tab, validate_headers, SheetsApi};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Cell range probed during the data access check
const SAMPLE_RANGE: &str = "A1:P5";

/// Diagnostic check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Individual diagnostic check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Pass,
            message: message.into(),
            details: None,
        }
    }

    pub fn warn(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warn,
            message: message.into(),
            details: None,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Fail,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Overall diagnostic report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorReport {
    pub status: CheckStatus,
    pub generated_at: DateTime<Utc>,
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    fn from_checks(checks: Vec<CheckResult>) -> Self {
        let status = checks
            .iter()
            .map(|check| check.status)
            .fold(CheckStatus::Pass, worst);

        Self {
            status,
            generated_at: Utc::now(),
            checks,
        }
    }

    /// Render the report as human-readable text
    pub fn render(&self) -> String {
        let mut out = String::new();

        for check in &self.checks {
            let symbol = match check.status {
                CheckStatus::Pass => "✓",
                CheckStatus::Warn => "!",
                CheckStatus::Fail => "✗",
            };
            out.push_str(&format!("{} {}: {}\n", symbol, check.name, check.message));
        }

        out.push('\n');
        match self.status {
            CheckStatus::Pass => out.push_str("All checks passed\n"),
            CheckStatus::Warn => out.push_str("Checks passed with warnings\n"),
            CheckStatus::Fail => {
                let failed = self
                    .checks
                    .iter()
                    .filter(|check| check.status == CheckStatus::Fail)
                    .count();
                out.push_str(&format!("{} check(s) failed\n", failed));
            }
        }

        out
    }

    /// Save the report as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Doctor report saved to {}", path.display());
        Ok(())
    }
}

fn worst(a: CheckStatus, b: CheckStatus) -> CheckStatus {
    match (a, b) {
        (CheckStatus::Fail, _) | (_, CheckStatus::Fail) => CheckStatus::Fail,
        (CheckStatus::Warn, _) | (_, CheckStatus::Warn) => CheckStatus::Warn,
        _ => CheckStatus::Pass,
    }
}

/// Run all diagnostics.
///
/// `api` is `None` when credentials are missing; connectivity checks are
/// then skipped and only the environment is reported.
pub async fn run_doctor(settings: &Settings, api: Option<Arc<dyn SheetsApi>>) -> DoctorReport {
    info!("Running ratinglens diagnostics");

    let mut checks = Vec::new();

    checks.push(check_env_var(
        "GOOGLE_SHEET_ID",
        !settings.sheets.sheet_id.is_empty(),
    ));
    checks.push(check_env_var(
        "GOOGLE_SHEETS_API_KEY",
        !settings.sheets.api_key.is_empty(),
    ));

    if settings.completion.is_configured() {
        checks.push(CheckResult::pass("completion_key", "OPENAI_API_KEY is set"));
    } else {
        checks.push(CheckResult::warn(
            "completion_key",
            "OPENAI_API_KEY is not set, all answers will use the local fallback analyzer",
        ));
    }

    if let Some(api) = api {
        checks.extend(check_spreadsheet(settings, api.as_ref()).await);
    }

    DoctorReport::from_checks(checks)
}

fn check_env_var(name: &str, set: bool) -> CheckResult {
    if set {
        CheckResult::pass("environment", format!("{} is set", name))
    } else {
        CheckResult::fail("environment", format!("{} is not set", name))
    }
}

async fn check_spreadsheet(settings: &Settings, api: &dyn SheetsApi) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    let titles = match api.tab_titles().await {
        Ok(titles) => {
            checks.push(
                CheckResult::pass(
                    "spreadsheet_access",
                    format!("Spreadsheet reachable with {} tab(s)", titles.len()),
                )
                .with_details(serde_json::json!({ "tabs": titles })),
            );
            titles
        }
        Err(e) => {
            checks.push(CheckResult::fail("spreadsheet_access", e.to_string()));
            return checks;
        }
    };

    let tab = select_tab(
        &titles,
        &settings.sheets.tab_keyword,
        &settings.sheets.default_tab,
    );
    if titles.contains(&tab) {
        checks.push(CheckResult::pass(
            "tab_selection",
            format!("Will read tab \"{}\"", tab),
        ));
    } else {
        checks.push(CheckResult::warn(
            "tab_selection",
            format!(
                "No tab name contains \"{}\" and the default tab \"{}\" does not exist",
                settings.sheets.tab_keyword, tab
            ),
        ));
    }

    match api.values(&tab, SAMPLE_RANGE).await {
        Ok(rows) if rows.is_empty() => {
            checks.push(CheckResult::warn(
                "data_access",
                format!("Tab \"{}\" has no data", tab),
            ));
        }
        Ok(rows) => {
            checks.push(
                CheckResult::pass(
                    "data_access",
                    format!("Fetched {} sample row(s) from \"{}\"", rows.len(), tab),
                )
                .with_details(serde_json::json!({ "headers": rows[0] })),
            );

            match validate_headers(&rows[0]) {
                Ok(()) => {
                    checks.push(CheckResult::pass(
                        "header_schema",
                        "All required columns present",
                    ));
                }
                Err(e) => {
                    checks.push(CheckResult::fail("header_schema", e.to_string()));
                }
            }
        }
        Err(e) => {
            checks.push(CheckResult::fail("data_access", e.to_string()));
        }
    }

    checks
}
