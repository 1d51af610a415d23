//! Scenario impact result.

use serde::{Deserialize, Serialize};

use super::bridge::EbitdaBridge;
use super::outlook::ScenarioOutlook;
use super::risk::RiskAssessment;

/// Derived deltas of one scenario against its baseline.
///
/// Constructed fresh by [`ImpactCalculator::compute`](super::ImpactCalculator::compute);
/// carries no identity and is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioImpact {
    /// Revenue effect of the price change
    pub price_impact: f64,
    /// Revenue effect of the volume change
    pub volume_impact: f64,
    /// EBITDA effect of the cost change
    pub cost_impact: f64,
    /// Revenue subject to FX translation
    pub international_exposure: f64,
    /// EBITDA effect of the FX rate move
    pub fx_impact: f64,
    /// Net income effect of the tax rate change
    pub tax_impact: f64,

    /// Price plus volume
    pub revenue_impact: f64,
    /// Price, volume, cost and FX
    pub ebitda_impact: f64,
    /// EBITDA impact plus tax impact
    pub net_income_impact: f64,

    /// Revenue impact in percent of baseline revenue
    pub revenue_impact_pct: f64,
    /// EBITDA impact in percent of baseline EBITDA
    pub ebitda_impact_pct: f64,
    /// Net income impact in percent of baseline net income
    pub net_income_impact_pct: f64,

    /// Baseline revenue
    pub base_revenue: f64,
    /// Baseline EBITDA
    pub base_ebitda: f64,
    /// Baseline net income
    pub base_net_income: f64,
    /// Scenario revenue
    pub new_revenue: f64,
    /// Scenario EBITDA
    pub new_ebitda: f64,
    /// Scenario net income
    pub new_net_income: f64,

    /// Qualitative bands
    pub risk_assessment: RiskAssessment,
}

impl ScenarioImpact {
    /// Outlook derived from the EBITDA impact percentage.
    pub fn outlook(&self) -> ScenarioOutlook {
        ScenarioOutlook::from_ebitda_impact_pct(self.ebitda_impact_pct)
    }

    /// Step-by-step EBITDA bridge.
    pub fn bridge(&self) -> EbitdaBridge {
        EbitdaBridge::from_impact(self)
    }

    /// Whether the scenario improves EBITDA.
    pub fn is_ebitda_accretive(&self) -> bool {
        self.ebitda_impact > 0.0
    }
}
