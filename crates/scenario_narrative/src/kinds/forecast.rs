//! Forecast recommendations narrative.

use scenario_core::forecast::{Forecast, ForecastHorizon, ScenarioSummary};
use serde::{Deserialize, Serialize};

use crate::generator::{GenerationRequest, TextGenerator};
use crate::narrative::{generate_or_fallback, Narrative};

/// Probability × impact at or above which a risk is treated as severe.
pub const HIGH_SEVERITY_THRESHOLD: f64 = 0.4;

/// Figures the recommendations are written from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastContext {
    /// Revenue of the seed quarter
    pub current_revenue: f64,
    /// EBITDA of the seed quarter
    pub current_ebitda: f64,
    /// Annual growth assumption in percent
    pub growth_rate_pct: f64,
    /// Projection horizon
    pub horizon: ForecastHorizon,
    /// Mean projected revenue
    pub projected_average_revenue: f64,
    /// Mean projected EBITDA margin in percent
    pub projected_average_margin_pct: f64,
    /// Market conditions note
    pub market_conditions: Option<String>,
    /// Growth scenarios compared alongside the projection
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioSummary>,
}

impl ForecastContext {
    /// Build the context from a projection.
    pub fn from_forecast(forecast: &Forecast) -> Self {
        let seed = &forecast.seed;
        Self {
            current_revenue: seed.revenue,
            current_ebitda: seed.revenue * seed.ebitda_margin,
            growth_rate_pct: forecast.options.annual_growth_pct,
            horizon: forecast.options.horizon,
            projected_average_revenue: forecast.average_revenue(),
            projected_average_margin_pct: forecast.average_margin_pct(),
            market_conditions: None,
            scenarios: Vec::new(),
        }
    }

    /// Attach a market conditions note.
    pub fn with_market_conditions(mut self, note: Option<String>) -> Self {
        self.market_conditions = note;
        self
    }

    /// Attach compared scenarios.
    pub fn with_scenarios(mut self, scenarios: Vec<ScenarioSummary>) -> Self {
        self.scenarios = scenarios;
        self
    }
}

/// A growth opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicOpportunity {
    /// Short name
    pub title: String,
    /// Expected effect, free text
    pub impact: String,
    /// Expected timeline, free text
    pub timeline: String,
    /// Detail
    pub description: String,
    /// Concrete steps
    #[serde(default)]
    pub key_actions: Vec<String>,
}

/// A risk to the forecast, scored on 0..=1 scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRisk {
    /// Short name
    pub title: String,
    /// Likelihood
    pub probability: f64,
    /// Severity if it materialises
    pub impact: f64,
    /// Mitigation plan
    pub mitigation: String,
}

impl ForecastRisk {
    /// Probability × impact.
    pub fn severity(&self) -> f64 {
        self.probability * self.impact
    }
}

/// A lever with its EBITDA effect in percentage points and 0..=1 feasibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceLever {
    /// Lever name
    pub lever: String,
    /// Effect
    pub impact: f64,
    /// Feasibility
    pub feasibility: f64,
}

/// A data-driven observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessInsight {
    /// Short name
    pub title: String,
    /// Detail
    pub description: String,
}

/// A decision with its trade-offs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Decision to take
    pub decision: String,
    /// Best outcome
    pub upside: String,
    /// Worst outcome
    pub downside: String,
    /// When to decide
    pub timeline: String,
    /// Indicators to monitor
    pub kpis: String,
}

/// Strategic recommendations for a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecommendations {
    /// Outlook in three to four sentences
    pub executive_summary: String,
    /// Opportunities
    #[serde(default)]
    pub strategic_opportunities: Vec<StrategicOpportunity>,
    /// Risks
    #[serde(default)]
    pub risks: Vec<ForecastRisk>,
    /// Levers
    #[serde(default)]
    pub performance_levers: Vec<PerformanceLever>,
    /// Insights
    #[serde(default)]
    pub business_insights: Vec<BusinessInsight>,
    /// Decision framework
    #[serde(default)]
    pub decision_framework: Vec<Decision>,
    /// Takeaways
    #[serde(default)]
    pub executive_takeaways: Vec<String>,
}

impl ForecastRecommendations {
    /// Risks with severity at or above [`HIGH_SEVERITY_THRESHOLD`], most severe first.
    pub fn high_severity_risks(&self) -> Vec<&ForecastRisk> {
        let mut risks: Vec<&ForecastRisk> = self
            .risks
            .iter()
            .filter(|r| r.severity() >= HIGH_SEVERITY_THRESHOLD)
            .collect();
        risks.sort_by(|a, b| b.severity().total_cmp(&a.severity()));
        risks
    }

    /// Levers ordered by impact × feasibility, best first.
    pub fn ranked_levers(&self) -> Vec<&PerformanceLever> {
        let mut levers: Vec<&PerformanceLever> = self.performance_levers.iter().collect();
        levers.sort_by(|a, b| (b.impact * b.feasibility).total_cmp(&(a.impact * a.feasibility)));
        levers
    }

    /// Static recommendations used when generation fails.
    pub fn fallback() -> Self {
        let risk = |title: &str, probability: f64, impact: f64, mitigation: &str| ForecastRisk {
            title: title.to_string(),
            probability,
            impact,
            mitigation: mitigation.to_string(),
        };
        let lever = |lever: &str, impact: f64, feasibility: f64| PerformanceLever {
            lever: lever.to_string(),
            impact,
            feasibility,
        };
        Self {
            executive_summary: "The projection points to moderate growth. Cost discipline and \
                targeted investment in higher-margin segments are the main routes to margin \
                improvement over the horizon."
                .to_string(),
            strategic_opportunities: vec![
                StrategicOpportunity {
                    title: "Portfolio Optimisation".to_string(),
                    impact: "EBITDA margin improvement".to_string(),
                    timeline: "12-18 months".to_string(),
                    description: "Shift resources from low-margin products to the strongest \
                        categories."
                        .to_string(),
                    key_actions: vec![
                        "Run a profitability review across the portfolio".to_string(),
                        "Plan the phase-out of the weakest products".to_string(),
                    ],
                },
                StrategicOpportunity {
                    title: "Pricing Refinement".to_string(),
                    impact: "Incremental revenue".to_string(),
                    timeline: "6-9 months".to_string(),
                    description: "Value-based pricing in premium segments while protecting \
                        volume in competitive ones."
                        .to_string(),
                    key_actions: vec![
                        "Measure price elasticity by customer segment".to_string(),
                        "Set discount guidelines for the sales team".to_string(),
                    ],
                },
            ],
            risks: vec![
                risk(
                    "Input Cost Inflation",
                    0.7,
                    0.6,
                    "Dual sourcing and periodic price-lock agreements.",
                ),
                risk(
                    "Competitive Disruption",
                    0.4,
                    0.8,
                    "Shorter release cycles and competitor monitoring.",
                ),
                risk(
                    "FX Exposure",
                    0.6,
                    0.5,
                    "Hedge forecast exposure and balance supply currency mix.",
                ),
            ],
            performance_levers: vec![
                lever("Price Optimisation", 3.5, 0.8),
                lever("Product Mix Shift", 4.2, 0.7),
                lever("Process Automation", 2.8, 0.6),
                lever("Procurement Savings", 1.9, 0.9),
            ],
            business_insights: vec![BusinessInsight {
                title: "Margin Concentration".to_string(),
                description: "Most of the margin typically comes from a minority of segments; \
                    confirm with the segment ranking before reallocating budget."
                    .to_string(),
            }],
            decision_framework: vec![Decision {
                decision: "Accelerate investment in top segments".to_string(),
                upside: "Faster margin expansion".to_string(),
                downside: "Higher concentration risk".to_string(),
                timeline: "Next planning cycle".to_string(),
                kpis: "Segment margin, revenue growth, customer retention".to_string(),
            }],
            executive_takeaways: vec![
                "Growth is achievable but margin depends on cost control".to_string(),
                "Prioritise the levers with the best impact-to-feasibility ratio".to_string(),
            ],
        }
    }
}

/// Prompt asking for [`ForecastRecommendations`].
pub fn forecast_prompt(context: &ForecastContext) -> GenerationRequest {
    let data = serde_json::to_string_pretty(context).unwrap_or_default();
    GenerationRequest::json(format!(
        "You are a financial forecasting and strategy analyst. Analyse the data below and \
         produce:\n\
         1. An executive summary of the outlook in three to four sentences\n\
         2. Three to four strategic opportunities with impact, timeline and key actions\n\
         3. Risks with probability and impact between 0 and 1, and a mitigation\n\
         4. Performance levers with impact in EBITDA percentage points and feasibility \
         between 0 and 1\n\
         5. Three to four business insights\n\
         6. A decision framework\n\
         7. Two to three executive takeaways\n\n\
         Financial data:\n{data}\n\n\
         Respond with a JSON object with the keys executive_summary, \
         strategic_opportunities (title, impact, timeline, description, key_actions), \
         risks (title, probability, impact, mitigation), \
         performance_levers (lever, impact, feasibility), \
         business_insights (title, description), \
         decision_framework (decision, upside, downside, timeline, kpis) and \
         executive_takeaways."
    ))
}

/// Generate recommendations, falling back to [`ForecastRecommendations::fallback`].
pub async fn recommend_for_forecast(
    generator: &dyn TextGenerator,
    context: &ForecastContext,
) -> Narrative<ForecastRecommendations> {
    generate_or_fallback(
        generator,
        &forecast_prompt(context),
        ForecastRecommendations::fallback,
    )
    .await
}
