//! Qualitative risk bands.
//!
//! Each category is an independent band lookup on one computed figure; there
//! is no ordering dependency between them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::{BandThresholds, RiskThresholds};

/// Risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    /// Within tolerance
    Low,
    /// Needs monitoring
    Medium,
    /// Needs mitigation
    High,
}

impl RiskBand {
    /// Band name as displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Band for a value where larger is riskier. Edges are exclusive.
    pub fn above(value: f64, thresholds: BandThresholds) -> Self {
        if value > thresholds.high {
            Self::High
        } else if value > thresholds.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Band for a value where smaller is riskier. Edges are exclusive.
    pub fn below(value: f64, thresholds: BandThresholds) -> Self {
        if value < thresholds.high {
            Self::High
        } else if value < thresholds.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk categories reported for every scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskCategory {
    /// Currency translation exposure
    Fx,
    /// EBITDA margin erosion
    Margin,
    /// Competitor response to price increases
    Competitive,
    /// Delivering a volume increase
    Execution,
    /// Aggregate
    Overall,
}

impl RiskCategory {
    /// All categories in reporting order.
    pub const ALL: [RiskCategory; 5] = [
        Self::Fx,
        Self::Margin,
        Self::Competitive,
        Self::Execution,
        Self::Overall,
    ];

    /// Display name, also used as the serialised key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fx => "FX Risk",
            Self::Margin => "Margin Risk",
            Self::Competitive => "Competitive Risk",
            Self::Execution => "Execution Risk",
            Self::Overall => "Overall Risk",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Five-entry qualitative assessment of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Band on `|fx_impact|`
    #[serde(rename = "FX Risk")]
    pub fx: RiskBand,
    /// Band on `ebitda_impact_pct`
    #[serde(rename = "Margin Risk")]
    pub margin: RiskBand,
    /// Band on `price_change_pct`
    #[serde(rename = "Competitive Risk")]
    pub competitive: RiskBand,
    /// Band on `volume_change_pct`
    #[serde(rename = "Execution Risk")]
    pub execution: RiskBand,
    /// Band on `ebitda_impact_pct`
    #[serde(rename = "Overall Risk")]
    pub overall: RiskBand,
}

impl RiskAssessment {
    /// Classify computed figures against the given thresholds.
    pub fn classify(
        fx_impact: f64,
        ebitda_impact_pct: f64,
        price_change_pct: f64,
        volume_change_pct: f64,
        thresholds: &RiskThresholds,
    ) -> Self {
        Self {
            fx: RiskBand::above(fx_impact.abs(), thresholds.fx),
            margin: RiskBand::below(ebitda_impact_pct, thresholds.margin),
            competitive: RiskBand::above(price_change_pct, thresholds.competitive),
            execution: RiskBand::above(volume_change_pct, thresholds.execution),
            overall: RiskBand::below(ebitda_impact_pct, thresholds.overall),
        }
    }

    /// Band for one category.
    pub fn get(&self, category: RiskCategory) -> RiskBand {
        match category {
            RiskCategory::Fx => self.fx,
            RiskCategory::Margin => self.margin,
            RiskCategory::Competitive => self.competitive,
            RiskCategory::Execution => self.execution,
            RiskCategory::Overall => self.overall,
        }
    }

    /// Iterate over `(category, band)` in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (RiskCategory, RiskBand)> + '_ {
        RiskCategory::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Categories currently in the High band.
    pub fn high_risks(&self) -> Vec<RiskCategory> {
        self.iter()
            .filter(|(_, band)| *band == RiskBand::High)
            .map(|(category, _)| category)
            .collect()
    }
}
