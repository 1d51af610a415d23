//! Forecast horizons.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ForecastError;

/// Length of a quarterly projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForecastHorizon {
    /// 4 quarters
    #[serde(rename = "12m")]
    Months12,
    /// 8 quarters
    #[default]
    #[serde(rename = "24m")]
    Months24,
    /// 12 quarters
    #[serde(rename = "36m")]
    Months36,
    /// 20 quarters
    #[serde(rename = "5y")]
    Years5,
}

impl ForecastHorizon {
    /// All horizons, shortest first.
    pub const ALL: [ForecastHorizon; 4] = [
        Self::Months12,
        Self::Months24,
        Self::Months36,
        Self::Years5,
    ];

    /// Number of projected quarters.
    pub fn quarters(&self) -> usize {
        match self {
            Self::Months12 => 4,
            Self::Months24 => 8,
            Self::Months36 => 12,
            Self::Years5 => 20,
        }
    }

    /// Short code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Months12 => "12m",
            Self::Months24 => "24m",
            Self::Months36 => "36m",
            Self::Years5 => "5y",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Months12 => "12 Months",
            Self::Months24 => "24 Months",
            Self::Months36 => "36 Months",
            Self::Years5 => "5 Years",
        }
    }
}

impl fmt::Display for ForecastHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ForecastHorizon {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|h| h.code().eq_ignore_ascii_case(s) || h.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ForecastError::InvalidParameter(format!("unknown horizon '{s}'")))
    }
}
