//! Scenario outlook derived from the EBITDA impact.

use std::fmt;

use serde::{Deserialize, Serialize};

/// EBITDA impact % above which a scenario is favourable.
pub const FAVOURABLE_THRESHOLD_PCT: f64 = 5.0;

/// EBITDA impact % below which a scenario is unfavourable.
pub const UNFAVOURABLE_THRESHOLD_PCT: f64 = -5.0;

/// Coarse verdict on a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioOutlook {
    /// EBITDA impact above +5%
    Favourable,
    /// Between the two thresholds, inclusive
    Moderate,
    /// EBITDA impact below -5%
    Unfavourable,
}

impl ScenarioOutlook {
    /// Classify an EBITDA impact percentage.
    pub fn from_ebitda_impact_pct(pct: f64) -> Self {
        if pct > FAVOURABLE_THRESHOLD_PCT {
            Self::Favourable
        } else if pct < UNFAVOURABLE_THRESHOLD_PCT {
            Self::Unfavourable
        } else {
            Self::Moderate
        }
    }

    /// One-line guidance shown next to the verdict.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Favourable => {
                "Material upside; proceed while tracking customer response to the price move."
            }
            Self::Moderate => "Limited effect; roll out in phases and measure before committing.",
            Self::Unfavourable => {
                "Material downside; revisit the assumptions before any commitment."
            }
        }
    }
}

impl fmt::Display for ScenarioOutlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Favourable => write!(f, "favourable"),
            Self::Moderate => write!(f, "moderate"),
            Self::Unfavourable => write!(f, "unfavourable"),
        }
    }
}
