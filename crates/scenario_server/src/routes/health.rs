//! Health check and readiness endpoints
//!
//! Used by load balancers and orchestrators to check service availability.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;

use super::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status ("healthy" or "unhealthy")
    pub status: String,
    /// Server version
    pub version: String,
    /// Server uptime in seconds
    pub uptime_secs: u64,
    /// Dependency status
    pub dependencies: DependencyStatus,
}

/// Dependency status for health check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyStatus {
    /// Baseline source name
    pub baseline_source: String,
    /// Narrative provider ("openai", "ollama" or "disabled")
    pub generator_provider: String,
    /// Narrative model
    pub generator_model: String,
}

/// Readiness response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    /// Ready status
    pub ready: bool,
    /// Reason when not ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Build the health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
}

/// GET /health - Health check endpoint
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    let response = HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: uptime,
        dependencies: DependencyStatus {
            baseline_source: state.baseline_source.name().to_string(),
            generator_provider: state.generator.provider().to_string(),
            generator_model: state.generator.model().to_string(),
        },
    };

    (StatusCode::OK, Json(response))
}

/// GET /ready - Readiness check endpoint
///
/// Returns 503 when the baseline source cannot produce a usable baseline.
async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    let baseline = state
        .baseline_source
        .snapshot()
        .and_then(|snapshot| snapshot.to_baseline());

    match baseline {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                reason: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Baseline source not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    ready: false,
                    reason: Some(e.to_string()),
                }),
            )
        }
    }
}
