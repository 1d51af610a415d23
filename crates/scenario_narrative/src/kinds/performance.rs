//! Performance summary narrative.

use scenario_core::baseline::{EBITDA, REVENUE};
use scenario_core::{BaselineError, MetricsSnapshot};
use serde::{Deserialize, Serialize};

use crate::generator::{GenerationRequest, TextGenerator};
use crate::narrative::{generate_or_fallback, Narrative};

/// Figures the performance summary is written from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceContext {
    /// Current revenue
    pub revenue: f64,
    /// Revenue one year earlier
    pub previous_revenue: f64,
    /// Current EBITDA
    pub ebitda: f64,
    /// EBITDA one year earlier
    pub previous_ebitda: f64,
    /// Revenue growth in percent; absent when previous revenue is zero
    pub yoy_growth_pct: Option<f64>,
    /// Best performing segment
    pub top_segment: Option<String>,
    /// Worst performing segment
    pub bottom_segment: Option<String>,
    /// Market conditions note
    pub market_conditions: Option<String>,
}

impl PerformanceContext {
    /// Build the context from a metrics snapshot.
    ///
    /// Revenue and EBITDA are required for both periods.
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Result<Self, BaselineError> {
        Ok(Self {
            revenue: snapshot.current_value(REVENUE)?,
            previous_revenue: snapshot.previous_value(REVENUE)?,
            ebitda: snapshot.current_value(EBITDA)?,
            previous_ebitda: snapshot.previous_value(EBITDA)?,
            yoy_growth_pct: snapshot.yoy_growth(REVENUE).ok(),
            top_segment: None,
            bottom_segment: None,
            market_conditions: snapshot.market_conditions.clone(),
        })
    }

    /// Name the best and worst segments.
    pub fn with_segments(
        mut self,
        top: Option<impl Into<String>>,
        bottom: Option<impl Into<String>>,
    ) -> Self {
        self.top_segment = top.map(Into::into);
        self.bottom_segment = bottom.map(Into::into);
        self
    }
}

/// One driver of performance with its share of the movement in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributingFactor {
    /// Driver name
    pub factor: String,
    /// Share of the movement
    pub impact: f64,
}

/// Executive summary of recent performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Three to four sentences
    pub executive_summary: String,
    /// Observations drawn from the figures
    #[serde(default)]
    pub key_findings: Vec<String>,
    /// Suggested actions
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Drivers of the movement
    #[serde(default)]
    pub contributing_factors: Vec<ContributingFactor>,
    /// Improvement opportunities
    #[serde(default)]
    pub opportunities: String,
}

impl PerformanceSummary {
    /// Static summary used when generation fails.
    ///
    /// Generic wording; it makes no claim about the figures themselves.
    pub fn fallback() -> Self {
        let factor = |factor: &str, impact: f64| ContributingFactor {
            factor: factor.to_string(),
            impact,
        };
        Self {
            executive_summary: "Revenue and EBITDA moved against the prior year with a mix of \
                pricing, volume and cost effects. A generated commentary is unavailable, so \
                this summary lists the standard review points for the period."
                .to_string(),
            key_findings: vec![
                "Compare year-over-year revenue growth against the market average".to_string(),
                "Check whether EBITDA margin kept pace with revenue".to_string(),
                "Identify the segments driving the change in either direction".to_string(),
                "Separate currency effects from underlying performance".to_string(),
            ],
            recommendations: vec![
                "Review pricing in segments where margin declined".to_string(),
                "Direct investment towards the strongest segments".to_string(),
                "Target cost reductions in underperforming segments".to_string(),
            ],
            contributing_factors: vec![
                factor("Product Mix", 35.0),
                factor("Market Expansion", 25.0),
                factor("Cost Inflation", 20.0),
                factor("Operational Efficiency", 15.0),
                factor("Currency Effects", 5.0),
            ],
            opportunities: "Segment-level pricing and cost analysis usually offers the fastest \
                margin improvement; rerun the summary once generation is available for a \
                figure-specific view."
                .to_string(),
        }
    }
}

/// Prompt asking for a [`PerformanceSummary`].
pub fn performance_prompt(context: &PerformanceContext) -> GenerationRequest {
    let data = serde_json::to_string_pretty(context).unwrap_or_default();
    GenerationRequest::json(format!(
        "You are a financial analyst. Analyse the performance data below and produce:\n\
         1. An executive summary of three to four sentences\n\
         2. Four to five key findings\n\
         3. Three to four actionable recommendations\n\
         4. Contributing factors with their share of the movement in percent\n\
         5. A short paragraph on opportunities for improvement\n\n\
         Financial data:\n{data}\n\n\
         Respond with a JSON object of the form:\n\
         {{\"executive_summary\": \"...\", \"key_findings\": [\"...\"], \
         \"recommendations\": [\"...\"], \
         \"contributing_factors\": [{{\"factor\": \"...\", \"impact\": 0.0}}], \
         \"opportunities\": \"...\"}}"
    ))
}

/// Generate a performance summary, falling back to [`PerformanceSummary::fallback`].
pub async fn summarise_performance(
    generator: &dyn TextGenerator,
    context: &PerformanceContext,
) -> Narrative<PerformanceSummary> {
    generate_or_fallback(
        generator,
        &performance_prompt(context),
        PerformanceSummary::fallback,
    )
    .await
}
