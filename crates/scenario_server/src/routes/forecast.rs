//! Revenue forecast endpoints
//!
//! - `GET /api/v1/forecast/presets`
//! - `POST /api/v1/forecast`
//! - `POST /api/v1/forecast/compare`

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use scenario_core::forecast::{
    compare_scenarios, project, Forecast, ForecastHorizon, ForecastOptions, ForecastSeed,
    GrowthScenario, ScenarioComparison,
};
use scenario_core::FiscalQuarter;

use super::{ApiError, ApiJson, AppState};

/// Preset description
#[derive(Debug, Clone, Serialize)]
pub struct PresetInfo {
    /// Wire identifier
    pub code: &'static str,
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Annual growth in percent
    pub annual_growth_pct: f64,
    /// Margin change in percentage points
    pub margin_change_pp: f64,
    /// Risk score
    pub risk_score: f64,
    /// Sustainability score
    pub sustainability_score: f64,
}

impl From<GrowthScenario> for PresetInfo {
    fn from(scenario: GrowthScenario) -> Self {
        Self {
            code: scenario.code(),
            name: scenario.name(),
            description: scenario.description(),
            annual_growth_pct: scenario.annual_growth_pct(),
            margin_change_pp: scenario.margin_change_pp(),
            risk_score: scenario.risk_score(),
            sustainability_score: scenario.sustainability_score(),
        }
    }
}

/// Horizon description
#[derive(Debug, Clone, Serialize)]
pub struct HorizonInfo {
    /// Wire identifier
    pub code: &'static str,
    /// Display label
    pub label: &'static str,
    /// Projected quarters
    pub quarters: usize,
}

/// Available presets and horizons
#[derive(Debug, Clone, Serialize)]
pub struct PresetsResponse {
    /// Growth presets in display order
    pub scenarios: Vec<PresetInfo>,
    /// Horizons, shortest first
    pub horizons: Vec<HorizonInfo>,
    /// Horizon used when a request names none
    pub default_horizon: ForecastHorizon,
}

/// Single projection request
///
/// Starts from the configured baseline unless `seed` is given. A preset sets
/// growth and margin; explicit `annual_growth_pct` and `margin_override`
/// take precedence over it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForecastRequest {
    /// Starting point override
    pub seed: Option<ForecastSeed>,
    /// Projection length
    pub horizon: ForecastHorizon,
    /// Growth preset
    pub scenario: Option<GrowthScenario>,
    /// Annual growth in percent; the Base Case rate when neither this nor a preset is given
    pub annual_growth_pct: Option<f64>,
    /// Fixed EBITDA margin as a fraction
    pub margin_override: Option<f64>,
    /// Seed for growth noise; noise-free when absent
    pub rng_seed: Option<u64>,
}

impl ForecastRequest {
    /// Projection options for `seed`
    pub fn options(&self, seed: &ForecastSeed) -> ForecastOptions {
        let mut options = match self.scenario {
            Some(scenario) => scenario.forecast_options(seed, self.horizon, self.rng_seed),
            None => ForecastOptions {
                seed: self.rng_seed,
                ..ForecastOptions::new(
                    self.horizon,
                    GrowthScenario::BaseCase.annual_growth_pct(),
                )
            },
        };
        if let Some(growth) = self.annual_growth_pct {
            options.annual_growth_pct = growth;
        }
        if let Some(margin) = self.margin_override {
            options.margin_override = Some(margin);
        }
        options
    }
}

/// Averages over the projected quarters
#[derive(Debug, Clone, Serialize)]
pub struct ForecastSummary {
    /// Mean revenue
    pub average_revenue: f64,
    /// Mean EBITDA
    pub average_ebitda: f64,
    /// Mean EBITDA margin in percent
    pub average_margin_pct: f64,
    /// Mean applied growth in percent
    pub average_growth_pct: f64,
    /// Mean ROI in percent
    pub average_roi_pct: f64,
    /// Last projected quarter
    pub final_period: Option<FiscalQuarter>,
}

impl From<&Forecast> for ForecastSummary {
    fn from(forecast: &Forecast) -> Self {
        Self {
            average_revenue: forecast.average_revenue(),
            average_ebitda: forecast.average_ebitda(),
            average_margin_pct: forecast.average_margin_pct(),
            average_growth_pct: forecast.average_growth_pct(),
            average_roi_pct: forecast.average_roi_pct(),
            final_period: forecast.last().map(|p| p.period),
        }
    }
}

/// Single projection response
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResponse {
    /// Preset used, if any
    pub scenario: Option<GrowthScenario>,
    /// Averages
    pub summary: ForecastSummary,
    /// Full projection
    pub forecast: Forecast,
}

/// Comparison request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompareRequest {
    /// Starting point override
    pub seed: Option<ForecastSeed>,
    /// Presets to compare; Base, Optimistic and Pessimistic when empty
    pub scenarios: Vec<GrowthScenario>,
    /// Projection length
    pub horizon: ForecastHorizon,
    /// Scenario the others are measured against
    pub reference: Option<GrowthScenario>,
    /// Seed for growth noise
    pub rng_seed: Option<u64>,
}

/// Build the forecast routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/forecast/presets", get(presets_handler))
        .route("/api/v1/forecast", post(forecast_handler))
        .route("/api/v1/forecast/compare", post(compare_handler))
}

fn resolve_seed(state: &AppState, seed: Option<ForecastSeed>) -> Result<ForecastSeed, ApiError> {
    match seed {
        Some(seed) => Ok(seed),
        None => state.default_seed(),
    }
}

/// Project the request against the configured or supplied seed
pub(crate) fn run_forecast(
    state: &AppState,
    request: &ForecastRequest,
) -> Result<Forecast, ApiError> {
    let seed = resolve_seed(state, request.seed)?;
    let options = request.options(&seed);
    let forecast = project(&seed, &options)?;

    tracing::debug!(
        horizon = options.horizon.code(),
        growth = options.annual_growth_pct,
        quarters = forecast.points.len(),
        "Forecast projected"
    );
    Ok(forecast)
}

/// Compare presets against the configured or supplied seed
pub(crate) fn run_comparison(
    state: &AppState,
    request: &CompareRequest,
) -> Result<ScenarioComparison, ApiError> {
    let seed = resolve_seed(state, request.seed)?;
    Ok(compare_scenarios(
        &seed,
        &request.scenarios,
        request.horizon,
        request.reference,
        request.rng_seed,
    )?)
}

/// GET /api/v1/forecast/presets
async fn presets_handler() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        scenarios: GrowthScenario::ALL.into_iter().map(PresetInfo::from).collect(),
        horizons: ForecastHorizon::ALL
            .into_iter()
            .map(|h| HorizonInfo {
                code: h.code(),
                label: h.label(),
                quarters: h.quarters(),
            })
            .collect(),
        default_horizon: ForecastHorizon::default(),
    })
}

/// POST /api/v1/forecast
async fn forecast_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ForecastRequest>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let forecast = run_forecast(&state, &request)?;
    Ok(Json(ForecastResponse {
        scenario: request.scenario,
        summary: ForecastSummary::from(&forecast),
        forecast,
    }))
}

/// POST /api/v1/forecast/compare
async fn compare_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CompareRequest>,
) -> Result<Json<ScenarioComparison>, ApiError> {
    Ok(Json(run_comparison(&state, &request)?))
}
