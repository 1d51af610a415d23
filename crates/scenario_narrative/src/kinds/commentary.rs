//! Commentary on a single scenario impact.
//!
//! Unlike the other narratives, the fallback here is derived from the impact
//! itself, so it stays specific to the scenario even without a generator.

use scenario_core::impact::{BridgeStepKind, RiskBand, ScenarioOutlook};
use scenario_core::{FinancialBaseline, ScenarioImpact, ScenarioParameters};
use serde::{Deserialize, Serialize};

use crate::generator::{GenerationRequest, TextGenerator};
use crate::narrative::{generate_or_fallback, Narrative};

/// Commentary on a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioCommentary {
    /// One line
    pub headline: String,
    /// Two to three sentences
    pub summary: String,
    /// Drivers in order of magnitude
    #[serde(default)]
    pub key_drivers: Vec<String>,
    /// Risk categories above Low
    #[serde(default)]
    pub risks_to_watch: Vec<String>,
    /// Suggested next step
    pub recommendation: String,
}

impl ScenarioCommentary {
    /// Deterministic commentary built from the computed figures.
    pub fn from_impact(impact: &ScenarioImpact) -> Self {
        let outlook = impact.outlook();

        let mut drivers: Vec<(String, f64)> = impact
            .bridge()
            .steps
            .into_iter()
            .filter(|s| s.kind == BridgeStepKind::Relative && s.value != 0.0)
            .map(|s| (s.label, s.value))
            .collect();
        drivers.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

        let risks_to_watch = impact
            .risk_assessment
            .iter()
            .filter(|(_, band)| *band != RiskBand::Low)
            .map(|(category, band)| format!("{}: {}", category.name(), band))
            .collect();

        Self {
            headline: format!(
                "{} scenario: EBITDA {:+.1}%",
                outlook_label(outlook),
                impact.ebitda_impact_pct
            ),
            summary: format!(
                "Revenue moves {:+.1}% and net income {:+.1}% against the baseline, taking \
                 EBITDA from {:.0} to {:.0}.",
                impact.revenue_impact_pct,
                impact.net_income_impact_pct,
                impact.base_ebitda,
                impact.new_ebitda
            ),
            key_drivers: drivers
                .into_iter()
                .map(|(label, value)| format!("{}: {:+.0}", label, value))
                .collect(),
            risks_to_watch,
            recommendation: outlook.guidance().to_string(),
        }
    }
}

fn outlook_label(outlook: ScenarioOutlook) -> &'static str {
    match outlook {
        ScenarioOutlook::Favourable => "Favourable",
        ScenarioOutlook::Moderate => "Moderate",
        ScenarioOutlook::Unfavourable => "Unfavourable",
    }
}

#[derive(Serialize)]
struct ScenarioContext<'a> {
    baseline: &'a FinancialBaseline,
    parameters: &'a ScenarioParameters,
    impact: &'a ScenarioImpact,
    outlook: ScenarioOutlook,
}

/// Prompt asking for a [`ScenarioCommentary`].
pub fn commentary_prompt(
    baseline: &FinancialBaseline,
    parameters: &ScenarioParameters,
    impact: &ScenarioImpact,
) -> GenerationRequest {
    let context = ScenarioContext {
        baseline,
        parameters,
        impact,
        outlook: impact.outlook(),
    };
    let data = serde_json::to_string_pretty(&context).unwrap_or_default();
    GenerationRequest::json(format!(
        "You are a financial planning analyst. Comment on the what-if scenario below. \
         All impacts are already computed; do not recompute them.\n\n\
         Scenario:\n{data}\n\n\
         Respond with a JSON object with the keys headline (one line), summary (two to three \
         sentences), key_drivers (list), risks_to_watch (list) and recommendation."
    ))
}

/// Generate commentary, falling back to [`ScenarioCommentary::from_impact`].
pub async fn comment_on_scenario(
    generator: &dyn TextGenerator,
    baseline: &FinancialBaseline,
    parameters: &ScenarioParameters,
    impact: &ScenarioImpact,
) -> Narrative<ScenarioCommentary> {
    generate_or_fallback(
        generator,
        &commentary_prompt(baseline, parameters, impact),
        || ScenarioCommentary::from_impact(impact),
    )
    .await
}
