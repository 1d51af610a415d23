//! Narrative endpoints
//!
//! - `POST /api/v1/narrative/scenario`
//! - `GET /api/v1/narrative/performance`
//! - `POST /api/v1/narrative/forecast`
//! - `GET /api/v1/narrative/quality`
//!
//! Figures are computed before the generator is called. Generator failures
//! never fail the request: the payload falls back and the `source` field
//! says so.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use scenario_narrative::kinds::{
    comment_on_scenario, plan_quality_actions, recommend_for_forecast, summarise_performance,
    ForecastContext, ForecastRecommendations, PerformanceContext, PerformanceSummary,
    QualityActionPlan, QualityContext, ScenarioCommentary,
};
use scenario_narrative::Narrative;

use super::forecast::{run_comparison, run_forecast, CompareRequest, ForecastRequest};
use super::impact::{ImpactRequest, ImpactResponse};
use super::{ApiError, ApiJson, AppState};

/// Scenario figures with commentary
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioNarrativeResponse {
    /// Computed scenario
    #[serde(flatten)]
    pub scenario: ImpactResponse,
    /// Commentary on it
    pub commentary: Narrative<ScenarioCommentary>,
}

/// Performance figures with summary
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceNarrativeResponse {
    /// Figures the summary was written from
    pub context: PerformanceContext,
    /// Summary
    pub summary: Narrative<PerformanceSummary>,
}

/// Forecast recommendation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastNarrativeRequest {
    /// Projection to comment on
    #[serde(flatten)]
    pub forecast: ForecastRequest,
    /// Also compare the default presets and hand them to the generator
    #[serde(default)]
    pub compare: bool,
}

/// Forecast figures with recommendations
#[derive(Debug, Clone, Serialize)]
pub struct ForecastNarrativeResponse {
    /// Figures the recommendations were written from
    pub context: ForecastContext,
    /// Recommendations
    pub recommendations: Narrative<ForecastRecommendations>,
}

/// Data quality figures with an action plan
#[derive(Debug, Clone, Serialize)]
pub struct QualityNarrativeResponse {
    /// Figures the plan was written from
    pub context: QualityContext,
    /// Action plan
    pub plan: Narrative<QualityActionPlan>,
}

/// Build the narrative routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/narrative/scenario", post(scenario_handler))
        .route("/api/v1/narrative/performance", get(performance_handler))
        .route("/api/v1/narrative/forecast", post(forecast_handler))
        .route("/api/v1/narrative/quality", get(quality_handler))
}

/// POST /api/v1/narrative/scenario
async fn scenario_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ImpactRequest>,
) -> Result<Json<ScenarioNarrativeResponse>, ApiError> {
    let baseline = state.resolve_baseline(request.baseline)?;
    let parameters = request.scenario.resolve(&baseline);
    let impact = state.calculator.compute(&baseline, &parameters)?;

    let commentary =
        comment_on_scenario(state.generator.as_ref(), &baseline, &parameters, &impact).await;

    Ok(Json(ScenarioNarrativeResponse {
        scenario: ImpactResponse::new(baseline, parameters, impact),
        commentary,
    }))
}

/// GET /api/v1/narrative/performance
async fn performance_handler(
    State(state): State<AppState>,
) -> Result<Json<PerformanceNarrativeResponse>, ApiError> {
    let snapshot = state.snapshot()?;
    let baseline = &state.config.baseline;
    let context = PerformanceContext::from_snapshot(&snapshot)?.with_segments(
        baseline.top_segment.clone(),
        baseline.bottom_segment.clone(),
    );

    let summary = summarise_performance(state.generator.as_ref(), &context).await;

    Ok(Json(PerformanceNarrativeResponse { context, summary }))
}

/// POST /api/v1/narrative/forecast
async fn forecast_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ForecastNarrativeRequest>,
) -> Result<Json<ForecastNarrativeResponse>, ApiError> {
    let forecast = run_forecast(&state, &request.forecast)?;
    let market_conditions = state.snapshot()?.market_conditions;

    let mut context = ForecastContext::from_forecast(&forecast)
        .with_market_conditions(market_conditions);
    if request.compare {
        let comparison = run_comparison(
            &state,
            &CompareRequest {
                seed: request.forecast.seed,
                horizon: request.forecast.horizon,
                rng_seed: request.forecast.rng_seed,
                ..Default::default()
            },
        )?;
        context = context.with_scenarios(comparison.summaries);
    }

    let recommendations = recommend_for_forecast(state.generator.as_ref(), &context).await;

    Ok(Json(ForecastNarrativeResponse {
        context,
        recommendations,
    }))
}

/// GET /api/v1/narrative/quality
async fn quality_handler(State(state): State<AppState>) -> Json<QualityNarrativeResponse> {
    let context = QualityContext::from_report(&state.config.quality);
    let plan = plan_quality_actions(state.generator.as_ref(), &context).await;

    Json(QualityNarrativeResponse { context, plan })
}
