//! Quarterly projection and growth scenario planning.

pub mod horizon;
pub mod presets;
pub mod projection;

pub use horizon::ForecastHorizon;
pub use presets::{
    compare_scenarios, GrowthScenario, RelativeImpact, ScenarioComparison, ScenarioSummary,
};
pub use projection::{
    project, quarterly_growth_rates, Forecast, ForecastOptions, ForecastPoint, ForecastSeed,
};
