//! Narrative kinds.
//!
//! Each kind pairs a payload type with a prompt builder and a fallback:
//! - [`performance`]: executive summary of current against previous period
//! - [`forecast`]: strategic recommendations for a projection
//! - [`commentary`]: commentary on one scenario impact
//! - [`quality`]: remediation plan for a data quality report

pub mod commentary;
pub mod forecast;
pub mod performance;
pub mod quality;

pub use commentary::{comment_on_scenario, commentary_prompt, ScenarioCommentary};
pub use forecast::{
    forecast_prompt, recommend_for_forecast, BusinessInsight, Decision, ForecastContext,
    ForecastRecommendations, ForecastRisk, PerformanceLever, StrategicOpportunity,
    HIGH_SEVERITY_THRESHOLD,
};
pub use performance::{
    performance_prompt, summarise_performance, ContributingFactor, PerformanceContext,
    PerformanceSummary,
};
pub use quality::{
    plan_quality_actions, quality_prompt, ActionItem, PriorityIssue, QualityActionPlan,
    QualityContext,
};
