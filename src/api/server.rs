//! HTTP API server for the analyze operation

use crate::analysis::Orchestrator;
use crate::types::AnalysisOutcome;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 3000).into(),
        }
    }
}

/// API server state shared across handlers
#[derive(Clone)]
struct AppState {
    /// Query pipeline
    orchestrator: Arc<Orchestrator>,
    /// Instance ID
    instance_id: String,
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    orchestrator: Arc<Orchestrator>,
    instance_id: String,
}

impl ApiServer {
    /// Create a new API server over an already-wired pipeline
    pub fn new(config: ApiServerConfig, orchestrator: Arc<Orchestrator>) -> Self {
        let instance_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

        Self {
            config,
            orchestrator,
            instance_id,
        }
    }

    /// Get instance ID
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build router
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/analyze", post(analyze_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start serving with dynamic port allocation
    ///
    /// Tries the configured address first, then attempts alternative ports
    /// if the primary port is unavailable.
    pub async fn serve(self) -> anyhow::Result<()> {
        let state = AppState {
            orchestrator: self.orchestrator.clone(),
            instance_id: self.instance_id.clone(),
        };

        let router = Self::build_router(state);

        // Try configured address first
        match tokio::net::TcpListener::bind(self.config.addr).await {
            Ok(listener) => {
                info!(
                    "API server [{}] listening on http://{}",
                    self.instance_id, self.config.addr
                );
                axum::serve(listener, router).await?;
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                debug!(
                    "Port {} in use, trying alternative ports...",
                    self.config.addr.port()
                );
            }
            Err(e) => return Err(e.into()),
        }

        // Try alternative ports
        let base_port = self.config.addr.port();
        for offset in 1..=10 {
            let alt_port = base_port + offset;
            let alt_addr = SocketAddr::new(self.config.addr.ip(), alt_port);

            match tokio::net::TcpListener::bind(alt_addr).await {
                Ok(listener) => {
                    info!(
                        "API server [{}] listening on http://{}",
                        self.instance_id, alt_addr
                    );
                    axum::serve(listener, router).await?;
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(anyhow::anyhow!(
            "All ports ({}-{}) are in use, API server unavailable for instance {}",
            base_port,
            base_port + 10,
            self.instance_id
        ))
    }
}

/// Analyze request body
#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    query: String,
}

/// Analyze response envelope
#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Answer(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            AnalysisOutcome::Failed(error) => Self {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

/// Analyze handler
///
/// A failed analysis still answers 200 with a `success: false` envelope;
/// only a missing query is rejected outright.
async fn analyze_handler(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> (StatusCode, Json<AnalyzeResponse>) {
    if req.query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AnalyzeResponse {
                success: false,
                data: None,
                error: Some("Query is required".to_string()),
            }),
        );
    }

    debug!("Received analyze request");
    let outcome = state.orchestrator.analyze_query(&req.query).await;

    (StatusCode::OK, Json(outcome.into()))
}

/// Health check handler
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    instance_id: String,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetsConfig;
    use crate::services::{CompletionAnalyzer, MockCompletionApi};
    use crate::sheets::{MockSheetsApi, SheetSource};

    fn state_with(sheets: MockSheetsApi, completion: MockCompletionApi) -> AppState {
        let config = SheetsConfig {
            sheet_id: "sheet-123".to_string(),
            api_key: "key-456".to_string(),
            tab_keyword: "Poll".to_string(),
            default_tab: "Sheet1".to_string(),
            cell_range: "A1:P1000".to_string(),
            timeout_secs: 30,
        };

        AppState {
            orchestrator: Arc::new(Orchestrator::new(
                SheetSource::new(Arc::new(sheets), config),
                CompletionAnalyzer::new(Arc::new(completion)),
            )),
            instance_id: "test-instance".to_string(),
        }
    }

    fn idle_state() -> AppState {
        let mut sheets = MockSheetsApi::new();
        sheets.expect_tab_titles().times(0);
        let mut completion = MockCompletionApi::new();
        completion.expect_complete().times(0);
        state_with(sheets, completion)
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let (status, response) = analyze_handler(
            State(idle_state()),
            Json(AnalyzeRequest {
                query: String::new(),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!response.0.success);
        assert_eq!(response.0.error.as_deref(), Some("Query is required"));
    }

    #[tokio::test]
    async fn test_analyze_returns_success_envelope() {
        let mut sheets = MockSheetsApi::new();
        sheets
            .expect_tab_titles()
            .returning(|| Ok(vec!["Poll".to_string()]));
        sheets.expect_values().returning(|_, _| {
            Ok(vec![
                vec![
                    "Instructor".to_string(),
                    "Domain".to_string(),
                    "Topic Code".to_string(),
                    "Session Date".to_string(),
                    "Overall Average Rating".to_string(),
                ],
                vec![
                    "John".to_string(),
                    "Backend".to_string(),
                    "B1".to_string(),
                    "2025-01-01".to_string(),
                    "4.5".to_string(),
                ],
            ])
        });

        let mut completion = MockCompletionApi::new();
        completion
            .expect_complete()
            .returning(|_, _| Ok("John has 1 session averaging 4.50.".to_string()));

        let (status, response) = analyze_handler(
            State(state_with(sheets, completion)),
            Json(AnalyzeRequest {
                query: "rating for John".to_string(),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.0.success);
        assert_eq!(
            response.0.data.as_deref(),
            Some("John has 1 session averaging 4.50.")
        );
        assert!(response.0.error.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_a_failure_envelope_not_an_http_error() {
        let mut sheets = MockSheetsApi::new();
        sheets.expect_tab_titles().returning(|| {
            Err(crate::error::RatinglensError::Fetch(
                "No data found in the spreadsheet".to_string(),
            ))
        });
        let mut completion = MockCompletionApi::new();
        completion.expect_complete().times(0);

        let (status, response) = analyze_handler(
            State(state_with(sheets, completion)),
            Json(AnalyzeRequest {
                query: "rating for John".to_string(),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!response.0.success);
        assert!(response.0.error.unwrap().contains("No data found"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health_handler(State(idle_state())).await;

        assert_eq!(response.0.status, "ok");
        assert_eq!(response.0.instance_id, "test-instance");
        assert!(!response.0.version.is_empty());
    }

    #[tokio::test]
    async fn test_router_dispatch() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let router = ApiServer::build_router(idle_state());

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // /analyze only accepts POST
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/analyze")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_envelope_serialization_shape() {
        let success: AnalyzeResponse = AnalysisOutcome::Answer("report".to_string()).into();
        let value = serde_json::to_value(&success).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], "report");
        assert!(value.get("error").is_none());

        let failure: AnalyzeResponse = AnalysisOutcome::Failed("boom".to_string()).into();
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("data").is_none());
    }
}
