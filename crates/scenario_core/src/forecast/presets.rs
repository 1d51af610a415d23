//! Named growth scenarios and their comparison.
//!
//! Provides ready-to-use planning scenarios:
//! - Base, optimistic and pessimistic growth
//! - Market disruption (contraction with margin squeeze)
//! - Rapid expansion (high growth bought with margin)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::horizon::ForecastHorizon;
use super::projection::{project, Forecast, ForecastOptions, ForecastSeed};
use crate::types::ForecastError;

/// Types of preset growth scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthScenario {
    /// 5% growth, margin unchanged
    BaseCase,
    /// 8.5% growth, margin +2pp
    Optimistic,
    /// 2% growth, margin -1.5pp
    Pessimistic,
    /// -3% growth, margin -4pp
    MarketDisruption,
    /// 12% growth, margin -0.5pp
    RapidExpansion,
}

impl GrowthScenario {
    /// All presets in display order.
    pub const ALL: [GrowthScenario; 5] = [
        Self::BaseCase,
        Self::Optimistic,
        Self::Pessimistic,
        Self::MarketDisruption,
        Self::RapidExpansion,
    ];

    /// Presets compared when the caller selects none.
    pub fn default_selection() -> Vec<Self> {
        vec![Self::BaseCase, Self::Optimistic, Self::Pessimistic]
    }

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BaseCase => "Base Case",
            Self::Optimistic => "Optimistic Scenario",
            Self::Pessimistic => "Pessimistic Scenario",
            Self::MarketDisruption => "Market Disruption",
            Self::RapidExpansion => "Rapid Expansion",
        }
    }

    /// Identifier used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BaseCase => "base_case",
            Self::Optimistic => "optimistic",
            Self::Pessimistic => "pessimistic",
            Self::MarketDisruption => "market_disruption",
            Self::RapidExpansion => "rapid_expansion",
        }
    }

    /// Get description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::BaseCase => "Current trajectory continues",
            Self::Optimistic => "Strong demand with operating leverage",
            Self::Pessimistic => "Soft demand and mild cost pressure",
            Self::MarketDisruption => "Revenue contraction with a margin squeeze",
            Self::RapidExpansion => "Aggressive growth funded from margin",
        }
    }

    /// Annual revenue growth in percent.
    pub fn annual_growth_pct(&self) -> f64 {
        match self {
            Self::BaseCase => 5.0,
            Self::Optimistic => 8.5,
            Self::Pessimistic => 2.0,
            Self::MarketDisruption => -3.0,
            Self::RapidExpansion => 12.0,
        }
    }

    /// EBITDA margin change in percentage points.
    pub fn margin_change_pp(&self) -> f64 {
        match self {
            Self::BaseCase => 0.0,
            Self::Optimistic => 2.0,
            Self::Pessimistic => -1.5,
            Self::MarketDisruption => -4.0,
            Self::RapidExpansion => -0.5,
        }
    }

    /// Higher growth scores lower.
    pub fn risk_score(&self) -> f64 {
        7.0 - self.annual_growth_pct() / 2.0
    }

    /// Smaller margin moves score higher.
    pub fn sustainability_score(&self) -> f64 {
        8.0 - self.margin_change_pp().abs()
    }

    /// Projection options for this scenario.
    ///
    /// The margin is fixed at the seed margin shifted by
    /// [`margin_change_pp`](Self::margin_change_pp).
    pub fn forecast_options(
        &self,
        seed: &ForecastSeed,
        horizon: ForecastHorizon,
        rng_seed: Option<u64>,
    ) -> ForecastOptions {
        ForecastOptions {
            horizon,
            annual_growth_pct: self.annual_growth_pct(),
            margin_override: Some(seed.ebitda_margin + self.margin_change_pp() / 100.0),
            seed: rng_seed,
        }
    }
}

impl fmt::Display for GrowthScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GrowthScenario {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|sc| {
                sc.name().eq_ignore_ascii_case(s.trim()) || sc.code() == key
            })
            .ok_or_else(|| ForecastError::InvalidParameter(format!("unknown scenario '{s}'")))
    }
}

/// Summary of one scenario's projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    /// Scenario
    pub scenario: GrowthScenario,
    /// Mean projected revenue
    pub average_revenue: f64,
    /// Mean projected EBITDA
    pub average_ebitda: f64,
    /// Mean EBITDA margin in percent
    pub average_margin_pct: f64,
    /// Mean applied quarterly growth rate
    pub average_growth_pct: f64,
    /// Mean ROI in percent
    pub average_roi_pct: f64,
    /// Preset annual growth rate
    pub growth_rate_pct: f64,
    /// `7 - growth / 2`
    pub risk_score: f64,
    /// `8 - |margin change|`
    pub sustainability_score: f64,
}

impl ScenarioSummary {
    fn from_forecast(scenario: GrowthScenario, forecast: &Forecast) -> Self {
        Self {
            scenario,
            average_revenue: forecast.average_revenue(),
            average_ebitda: forecast.average_ebitda(),
            average_margin_pct: forecast.average_margin_pct(),
            average_growth_pct: forecast.average_growth_pct(),
            average_roi_pct: forecast.average_roi_pct(),
            growth_rate_pct: scenario.annual_growth_pct(),
            risk_score: scenario.risk_score(),
            sustainability_score: scenario.sustainability_score(),
        }
    }
}

/// Difference of a scenario's averages from the reference scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeImpact {
    /// Scenario compared
    pub scenario: GrowthScenario,
    /// Average revenue difference
    pub revenue_impact: f64,
    /// In percent of the reference; zero for a non-positive reference
    pub revenue_impact_pct: f64,
    /// Average EBITDA difference
    pub ebitda_impact: f64,
    /// In percent of the reference; zero for a non-positive reference
    pub ebitda_impact_pct: f64,
}

fn share_pct(delta: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        delta / reference * 100.0
    } else {
        0.0
    }
}

/// Side-by-side comparison of several growth scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    /// Horizon used for every projection
    pub horizon: ForecastHorizon,
    /// Reference scenario
    pub reference: GrowthScenario,
    /// One summary per scenario, in request order
    pub summaries: Vec<ScenarioSummary>,
    /// Impact of every non-reference scenario against the reference
    pub impacts: Vec<RelativeImpact>,
}

/// Project and compare `scenarios` from the same seed.
///
/// The reference defaults to the Base Case when selected, else the first
/// scenario. An empty selection compares
/// [`default_selection`](GrowthScenario::default_selection).
pub fn compare_scenarios(
    seed: &ForecastSeed,
    scenarios: &[GrowthScenario],
    horizon: ForecastHorizon,
    reference: Option<GrowthScenario>,
    rng_seed: Option<u64>,
) -> Result<ScenarioComparison, ForecastError> {
    let selected = if scenarios.is_empty() {
        GrowthScenario::default_selection()
    } else {
        scenarios.to_vec()
    };

    let reference = match reference {
        Some(r) if selected.contains(&r) => r,
        Some(r) => {
            return Err(ForecastError::InvalidParameter(format!(
                "reference scenario '{}' is not among the compared scenarios",
                r.name()
            )))
        }
        None if selected.contains(&GrowthScenario::BaseCase) => GrowthScenario::BaseCase,
        None => selected[0],
    };

    let summaries = selected
        .iter()
        .map(|sc| {
            let forecast = project(seed, &sc.forecast_options(seed, horizon, rng_seed))?;
            Ok(ScenarioSummary::from_forecast(*sc, &forecast))
        })
        .collect::<Result<Vec<_>, ForecastError>>()?;

    let impacts = match summaries.iter().find(|s| s.scenario == reference) {
        Some(base) => summaries
            .iter()
            .filter(|s| s.scenario != reference)
            .map(|s| {
                let revenue_impact = s.average_revenue - base.average_revenue;
                let ebitda_impact = s.average_ebitda - base.average_ebitda;
                RelativeImpact {
                    scenario: s.scenario,
                    revenue_impact,
                    revenue_impact_pct: share_pct(revenue_impact, base.average_revenue),
                    ebitda_impact,
                    ebitda_impact_pct: share_pct(ebitda_impact, base.average_ebitda),
                }
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(ScenarioComparison {
        horizon,
        reference,
        summaries,
        impacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FiscalQuarter;
    use approx::assert_relative_eq;

    fn seed() -> ForecastSeed {
        ForecastSeed::new(FiscalQuarter::new(2023, 2).unwrap(), 105_200_000.0, 0.17)
    }

    #[test]
    fn test_preset_values() {
        let values: Vec<_> = GrowthScenario::ALL
            .iter()
            .map(|s| (s.annual_growth_pct(), s.margin_change_pp()))
            .collect();
        assert_eq!(
            values,
            vec![(5.0, 0.0), (8.5, 2.0), (2.0, -1.5), (-3.0, -4.0), (12.0, -0.5)]
        );
    }

    #[test]
    fn test_scores() {
        assert_eq!(GrowthScenario::BaseCase.risk_score(), 4.5);
        assert_eq!(GrowthScenario::MarketDisruption.risk_score(), 8.5);
        assert_eq!(GrowthScenario::MarketDisruption.sustainability_score(), 4.0);
        assert_eq!(GrowthScenario::Optimistic.sustainability_score(), 6.0);
    }

    #[test]
    fn test_margin_change_is_percentage_points() {
        let options =
            GrowthScenario::Optimistic.forecast_options(&seed(), ForecastHorizon::Months24, None);
        assert_relative_eq!(options.margin_override.unwrap(), 0.19, epsilon = 1e-12);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "market_disruption".parse::<GrowthScenario>().unwrap(),
            GrowthScenario::MarketDisruption
        );
        assert_eq!(
            "Rapid Expansion".parse::<GrowthScenario>().unwrap(),
            GrowthScenario::RapidExpansion
        );
        assert!("doom".parse::<GrowthScenario>().is_err());
    }

    #[test]
    fn test_compare_default_selection() {
        let comparison = compare_scenarios(&seed(), &[], ForecastHorizon::Months24, None, None).unwrap();
        assert_eq!(comparison.reference, GrowthScenario::BaseCase);
        assert_eq!(comparison.summaries.len(), 3);
        assert_eq!(comparison.impacts.len(), 2);

        let optimistic = &comparison.impacts[0];
        assert_eq!(optimistic.scenario, GrowthScenario::Optimistic);
        assert!(optimistic.revenue_impact > 0.0);
        assert!(optimistic.ebitda_impact_pct > 0.0);

        let pessimistic = &comparison.impacts[1];
        assert!(pessimistic.revenue_impact < 0.0);
    }

    #[test]
    fn test_compare_reference_fallback_and_errors() {
        let selected = [GrowthScenario::RapidExpansion, GrowthScenario::MarketDisruption];
        let comparison =
            compare_scenarios(&seed(), &selected, ForecastHorizon::Months12, None, Some(42)).unwrap();
        assert_eq!(comparison.reference, GrowthScenario::RapidExpansion);
        assert_eq!(comparison.impacts[0].scenario, GrowthScenario::MarketDisruption);

        let err = compare_scenarios(
            &seed(),
            &selected,
            ForecastHorizon::Months12,
            Some(GrowthScenario::BaseCase),
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_summary_margin_reflects_preset() {
        let comparison = compare_scenarios(
            &seed(),
            &[GrowthScenario::MarketDisruption],
            ForecastHorizon::Months12,
            None,
            None,
        )
        .unwrap();
        assert_relative_eq!(comparison.summaries[0].average_margin_pct, 13.0, max_relative = 1e-9);
        assert!(comparison.impacts.is_empty());
    }
}
