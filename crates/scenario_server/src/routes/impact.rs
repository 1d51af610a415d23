//! Scenario impact endpoints
//!
//! - `GET /api/v1/baseline`
//! - `POST /api/v1/impact`
//! - `POST /api/v1/impact/batch`
//! - `POST /api/v1/impact/grid`
//!
//! Every request may carry its own baseline; otherwise the configured one is
//! used. Scenario fields left out keep the baseline's values, so an empty
//! scenario is the neutral one.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use scenario_core::impact::{EbitdaBridge, GridAxes, ScenarioOutlook, SensitivityGrid};
use scenario_core::{
    FinancialBaseline, FiscalQuarter, MetricsSnapshot, ScenarioImpact, ScenarioParameters,
};

use super::{ApiError, ApiJson, AppState, ErrorResponse};

/// Largest accepted batch
pub const MAX_BATCH_SIZE: usize = 1_000;
/// Largest accepted grid axis
pub const MAX_GRID_STEPS: usize = 101;
/// Grid half-width when none is given, in percent
pub const DEFAULT_GRID_SPAN_PCT: f64 = 10.0;
/// Grid points per axis when none is given
pub const DEFAULT_GRID_STEPS: usize = 11;

/// Scenario adjustments as sent by clients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    /// Price change in percent
    pub price_change_pct: f64,
    /// Volume change in percent
    pub volume_change_pct: f64,
    /// Cost change in percent of revenue
    pub cost_change_pct: f64,
    /// Scenario FX rate; the baseline rate when absent
    pub fx_rate: Option<f64>,
    /// Scenario tax rate in percent; the baseline rate when absent
    pub tax_rate_pct: Option<f64>,
}

impl ScenarioInput {
    /// Parameters against `baseline`
    pub fn resolve(&self, baseline: &FinancialBaseline) -> ScenarioParameters {
        let mut params = ScenarioParameters::neutral(baseline)
            .with_price_change(self.price_change_pct)
            .with_volume_change(self.volume_change_pct)
            .with_cost_change(self.cost_change_pct);
        if let Some(fx_rate) = self.fx_rate {
            params = params.with_fx_rate(fx_rate);
        }
        if let Some(tax_rate) = self.tax_rate_pct {
            params = params.with_tax_rate(tax_rate);
        }
        params
    }
}

/// Configured baseline and its year-over-year growth
#[derive(Debug, Clone, Serialize)]
pub struct BaselineResponse {
    /// Source the metrics came from
    pub source: String,
    /// Current period
    pub period: FiscalQuarter,
    /// Baseline used when requests omit one
    pub baseline: FinancialBaseline,
    /// EBITDA margin in percent; absent for zero revenue
    pub ebitda_margin_pct: Option<f64>,
    /// Raw metrics
    pub snapshot: MetricsSnapshot,
    /// Growth in percent for every metric with a usable previous value
    pub growth_pct: BTreeMap<String, f64>,
}

/// Single scenario request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImpactRequest {
    /// Baseline override
    #[serde(default)]
    pub baseline: Option<FinancialBaseline>,
    /// Adjustments
    #[serde(flatten)]
    pub scenario: ScenarioInput,
}

/// Single scenario response
#[derive(Debug, Clone, Serialize)]
pub struct ImpactResponse {
    /// Baseline used
    pub baseline: FinancialBaseline,
    /// Resolved parameters
    pub parameters: ScenarioParameters,
    /// Computed impact
    pub impact: ScenarioImpact,
    /// Outlook
    pub outlook: ScenarioOutlook,
    /// Guidance for the outlook
    pub guidance: String,
    /// EBITDA bridge from baseline to scenario
    pub bridge: EbitdaBridge,
    /// Risk categories in the High band
    pub high_risks: Vec<String>,
}

impl ImpactResponse {
    /// Assemble the response for a computed impact
    pub fn new(
        baseline: FinancialBaseline,
        parameters: ScenarioParameters,
        impact: ScenarioImpact,
    ) -> Self {
        let outlook = impact.outlook();
        Self {
            baseline,
            parameters,
            outlook,
            guidance: outlook.guidance().to_string(),
            bridge: impact.bridge(),
            high_risks: impact
                .risk_assessment
                .high_risks()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            impact,
        }
    }
}

/// Batch request
#[derive(Debug, Clone, Deserialize)]
pub struct BatchImpactRequest {
    /// Baseline override shared by every scenario
    #[serde(default)]
    pub baseline: Option<FinancialBaseline>,
    /// Scenarios in evaluation order
    pub scenarios: Vec<ScenarioInput>,
}

/// Outcome of one batch entry
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    /// Position in the request
    pub index: usize,
    /// Impact, when computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<ScenarioImpact>,
    /// Outlook, when computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlook: Option<ScenarioOutlook>,
    /// Failure, when not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

/// Batch response
#[derive(Debug, Clone, Serialize)]
pub struct BatchImpactResponse {
    /// Baseline used
    pub baseline: FinancialBaseline,
    /// One entry per scenario, in request order
    pub results: Vec<BatchItem>,
    /// Entries with an impact
    pub succeeded: usize,
    /// Entries with an error
    pub failed: usize,
}

/// Sensitivity grid request
///
/// Explicit axes win over `span_pct`/`steps`; a missing axis falls back to
/// the symmetric one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GridRequest {
    /// Baseline override
    pub baseline: Option<FinancialBaseline>,
    /// Scenario the grid varies price and volume around
    pub base: ScenarioInput,
    /// Half-width of the symmetric axes in percent
    pub span_pct: Option<f64>,
    /// Points per symmetric axis
    pub steps: Option<usize>,
    /// Explicit price axis
    pub price_steps: Option<Vec<f64>>,
    /// Explicit volume axis
    pub volume_steps: Option<Vec<f64>>,
}

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridCell {
    /// Price change in percent
    pub price_change_pct: f64,
    /// Volume change in percent
    pub volume_change_pct: f64,
    /// EBITDA impact in percent
    pub ebitda_impact_pct: f64,
}

impl From<(f64, f64, f64)> for GridCell {
    fn from((price, volume, impact): (f64, f64, f64)) -> Self {
        Self {
            price_change_pct: price,
            volume_change_pct: volume,
            ebitda_impact_pct: impact,
        }
    }
}

/// Sensitivity grid response
#[derive(Debug, Clone, Serialize)]
pub struct GridResponse {
    /// Baseline used
    pub baseline: FinancialBaseline,
    /// Grid values
    pub grid: SensitivityGrid,
    /// Highest EBITDA impact
    pub best: Option<GridCell>,
    /// Lowest EBITDA impact
    pub worst: Option<GridCell>,
}

/// Build the impact routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/baseline", get(baseline_handler))
        .route("/api/v1/impact", post(impact_handler))
        .route("/api/v1/impact/batch", post(batch_handler))
        .route("/api/v1/impact/grid", post(grid_handler))
}

/// GET /api/v1/baseline
async fn baseline_handler(
    State(state): State<AppState>,
) -> Result<Json<BaselineResponse>, ApiError> {
    let snapshot = state.snapshot()?;
    let baseline = snapshot.to_baseline()?;

    Ok(Json(BaselineResponse {
        source: state.baseline_source.name().to_string(),
        period: state.config.baseline.period,
        ebitda_margin_pct: baseline.ebitda_margin_pct().ok(),
        growth_pct: snapshot.growth_table(),
        baseline,
        snapshot,
    }))
}

/// POST /api/v1/impact
async fn impact_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ImpactRequest>,
) -> Result<Json<ImpactResponse>, ApiError> {
    let baseline = state.resolve_baseline(request.baseline)?;
    let parameters = request.scenario.resolve(&baseline);
    let impact = state.calculator.compute(&baseline, &parameters)?;

    tracing::debug!(
        price = parameters.price_change_pct,
        volume = parameters.volume_change_pct,
        cost = parameters.cost_change_pct,
        ebitda_impact_pct = impact.ebitda_impact_pct,
        "Scenario computed"
    );

    Ok(Json(ImpactResponse::new(baseline, parameters, impact)))
}

/// POST /api/v1/impact/batch
async fn batch_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BatchImpactRequest>,
) -> Result<Json<BatchImpactResponse>, ApiError> {
    if request.scenarios.is_empty() {
        return Err(ApiError::validation(
            "scenarios must not be empty",
            "scenarios",
        ));
    }
    if request.scenarios.len() > MAX_BATCH_SIZE {
        return Err(ApiError::validation(
            format!(
                "batch of {} exceeds the limit of {}",
                request.scenarios.len(),
                MAX_BATCH_SIZE
            ),
            "scenarios",
        ));
    }

    let baseline = state.resolve_baseline(request.baseline)?;
    let parameters: Vec<ScenarioParameters> = request
        .scenarios
        .iter()
        .map(|s| s.resolve(&baseline))
        .collect();

    let calculator = state.calculator;
    let outcomes =
        tokio::task::spawn_blocking(move || calculator.compute_batch(&baseline, &parameters))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

    let results: Vec<BatchItem> = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| match outcome {
            Ok(impact) => BatchItem {
                index,
                outlook: Some(impact.outlook()),
                impact: Some(impact),
                error: None,
            },
            Err(e) => BatchItem {
                index,
                impact: None,
                outlook: None,
                error: Some(ApiError::from(e).to_response()),
            },
        })
        .collect();

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    tracing::debug!(size = results.len(), failed, "Batch computed");

    Ok(Json(BatchImpactResponse {
        baseline,
        succeeded: results.len() - failed,
        failed,
        results,
    }))
}

fn check_axis(axis: &[f64], field: &str) -> Result<(), ApiError> {
    if axis.is_empty() {
        return Err(ApiError::validation(
            format!("{} must not be empty", field),
            field,
        ));
    }
    if axis.len() > MAX_GRID_STEPS {
        return Err(ApiError::validation(
            format!("{} has more than {} points", field, MAX_GRID_STEPS),
            field,
        ));
    }
    Ok(())
}

fn grid_axes(request: &GridRequest) -> Result<GridAxes, ApiError> {
    let span = request.span_pct.unwrap_or(DEFAULT_GRID_SPAN_PCT);
    let steps = request.steps.unwrap_or(DEFAULT_GRID_STEPS);
    if steps > MAX_GRID_STEPS {
        return Err(ApiError::validation(
            format!("steps must not exceed {}", MAX_GRID_STEPS),
            "steps",
        ));
    }
    let symmetric = GridAxes::symmetric(span, steps).ok_or_else(|| {
        ApiError::validation("span_pct must be positive and steps at least 2", "steps")
    })?;

    let axes = GridAxes {
        price_steps: request
            .price_steps
            .clone()
            .unwrap_or(symmetric.price_steps),
        volume_steps: request
            .volume_steps
            .clone()
            .unwrap_or(symmetric.volume_steps),
    };
    check_axis(&axes.price_steps, "price_steps")?;
    check_axis(&axes.volume_steps, "volume_steps")?;
    Ok(axes)
}

/// POST /api/v1/impact/grid
async fn grid_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GridRequest>,
) -> Result<Json<GridResponse>, ApiError> {
    let axes = grid_axes(&request)?;
    let baseline = state.resolve_baseline(request.baseline)?;
    let base = request.base.resolve(&baseline);

    let calculator = state.calculator;
    let grid = tokio::task::spawn_blocking(move || {
        SensitivityGrid::compute(&calculator, &baseline, &base, &axes)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(GridResponse {
        baseline,
        best: grid.best().map(GridCell::from),
        worst: grid.worst().map(GridCell::from),
        grid,
    }))
}
