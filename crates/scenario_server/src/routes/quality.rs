//! Data quality endpoint
//!
//! - `GET /api/v1/quality`

use std::collections::BTreeMap;

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;

use scenario_core::quality::{Anomaly, CheckStatus, QualityMetrics, ValidationResult};

use super::AppState;

/// Data quality overview
#[derive(Debug, Clone, Serialize)]
pub struct QualityResponse {
    /// Headline scores
    pub metrics: QualityMetrics,
    /// Systems the data is drawn from
    pub data_sources: Vec<String>,
    /// Anomalies, most severe first
    pub anomalies: Vec<Anomaly>,
    /// Every check in report order
    pub validation_results: Vec<ValidationResult>,
    /// Checks per outcome
    pub status_counts: BTreeMap<CheckStatus, usize>,
}

/// Build the quality routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/quality", get(quality_handler))
}

/// GET /api/v1/quality
async fn quality_handler(State(state): State<AppState>) -> Json<QualityResponse> {
    let report = &state.config.quality;

    Json(QualityResponse {
        metrics: report.metrics(),
        data_sources: report.data_sources.clone(),
        anomalies: report.anomalies_by_severity().into_iter().cloned().collect(),
        validation_results: report.validation_results.clone(),
        status_counts: report.status_counts(),
    })
}
