//! Calculator constants and risk band thresholds.
//!
//! Defaults reproduce the reference behaviour exactly; every value can be
//! overridden from configuration.

use serde::{Deserialize, Serialize};

use crate::types::ImpactError;

/// Share of revenue denominated in foreign currency.
pub const DEFAULT_INTERNATIONAL_EXPOSURE: f64 = 0.40;

/// `|fx_impact|` above which FX risk is High.
pub const DEFAULT_FX_HIGH_THRESHOLD: f64 = 1_000_000.0;
/// `|fx_impact|` above which FX risk is Medium.
pub const DEFAULT_FX_MEDIUM_THRESHOLD: f64 = 500_000.0;

/// EBITDA impact % below which margin risk is High.
pub const DEFAULT_MARGIN_HIGH_THRESHOLD: f64 = -5.0;
/// EBITDA impact % below which margin risk is Medium.
pub const DEFAULT_MARGIN_MEDIUM_THRESHOLD: f64 = 0.0;

/// Price change % above which competitive risk is High.
pub const DEFAULT_COMPETITIVE_HIGH_THRESHOLD: f64 = 5.0;
/// Price change % above which competitive risk is Medium.
pub const DEFAULT_COMPETITIVE_MEDIUM_THRESHOLD: f64 = 2.0;

/// Volume change % above which execution risk is High.
pub const DEFAULT_EXECUTION_HIGH_THRESHOLD: f64 = 10.0;
/// Volume change % above which execution risk is Medium.
pub const DEFAULT_EXECUTION_MEDIUM_THRESHOLD: f64 = 5.0;

/// EBITDA impact % below which overall risk is High.
pub const DEFAULT_OVERALL_HIGH_THRESHOLD: f64 = -10.0;
/// EBITDA impact % below which overall risk is Medium.
pub const DEFAULT_OVERALL_MEDIUM_THRESHOLD: f64 = 0.0;

/// A pair of band edges.
///
/// Whether a value must lie above or below an edge depends on the risk
/// category; the edges themselves are always exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    /// Edge of the High band
    pub high: f64,
    /// Edge of the Medium band
    pub medium: f64,
}

impl BandThresholds {
    /// Create a new pair.
    pub const fn new(high: f64, medium: f64) -> Self {
        Self { high, medium }
    }
}

/// Thresholds for all five risk categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Applied to `|fx_impact|`, upward
    pub fx: BandThresholds,
    /// Applied to `ebitda_impact_pct`, downward
    pub margin: BandThresholds,
    /// Applied to `price_change_pct`, upward
    pub competitive: BandThresholds,
    /// Applied to `volume_change_pct`, upward
    pub execution: BandThresholds,
    /// Applied to `ebitda_impact_pct`, downward
    pub overall: BandThresholds,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            fx: BandThresholds::new(DEFAULT_FX_HIGH_THRESHOLD, DEFAULT_FX_MEDIUM_THRESHOLD),
            margin: BandThresholds::new(
                DEFAULT_MARGIN_HIGH_THRESHOLD,
                DEFAULT_MARGIN_MEDIUM_THRESHOLD,
            ),
            competitive: BandThresholds::new(
                DEFAULT_COMPETITIVE_HIGH_THRESHOLD,
                DEFAULT_COMPETITIVE_MEDIUM_THRESHOLD,
            ),
            execution: BandThresholds::new(
                DEFAULT_EXECUTION_HIGH_THRESHOLD,
                DEFAULT_EXECUTION_MEDIUM_THRESHOLD,
            ),
            overall: BandThresholds::new(
                DEFAULT_OVERALL_HIGH_THRESHOLD,
                DEFAULT_OVERALL_MEDIUM_THRESHOLD,
            ),
        }
    }
}

/// Configuration for [`ImpactCalculator`](super::ImpactCalculator).
///
/// # Examples
/// ```
/// use scenario_core::impact::ImpactConfig;
///
/// let config = ImpactConfig::default();
/// assert_eq!(config.international_exposure, 0.40);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Share of revenue exposed to FX movements, in `[0, 1]`
    pub international_exposure: f64,
    /// Risk band thresholds
    pub thresholds: RiskThresholds,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            international_exposure: DEFAULT_INTERNATIONAL_EXPOSURE,
            thresholds: RiskThresholds::default(),
        }
    }
}

impl ImpactConfig {
    /// Set the international exposure ratio.
    pub fn with_international_exposure(mut self, ratio: f64) -> Self {
        self.international_exposure = ratio;
        self
    }

    /// Set the risk thresholds.
    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Validate the configuration.
    ///
    /// Upward categories need `medium <= high`, downward ones `high <= medium`.
    pub fn validate(&self) -> Result<(), ImpactError> {
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&self.international_exposure) {
            errors.push(format!(
                "international_exposure {} must be within [0, 1]",
                self.international_exposure
            ));
        }

        let t = &self.thresholds;
        let upward = [
            ("fx", t.fx),
            ("competitive", t.competitive),
            ("execution", t.execution),
        ];
        for (name, band) in upward {
            if !band.high.is_finite() || !band.medium.is_finite() || band.medium > band.high {
                errors.push(format!(
                    "{name} thresholds must be finite with medium <= high (got medium={}, high={})",
                    band.medium, band.high
                ));
            }
        }

        let downward = [("margin", t.margin), ("overall", t.overall)];
        for (name, band) in downward {
            if !band.high.is_finite() || !band.medium.is_finite() || band.high > band.medium {
                errors.push(format!(
                    "{name} thresholds must be finite with high <= medium (got high={}, medium={})",
                    band.high, band.medium
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ImpactError::InvalidConfig(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ImpactConfig::default();
        assert_eq!(config.international_exposure, 0.40);
        assert_eq!(config.thresholds.fx.high, 1_000_000.0);
        assert_eq!(config.thresholds.fx.medium, 500_000.0);
        assert_eq!(config.thresholds.margin.high, -5.0);
        assert_eq!(config.thresholds.overall.high, -10.0);
        assert_eq!(config.thresholds.competitive.medium, 2.0);
        assert_eq!(config.thresholds.execution.high, 10.0);
    }

    #[test]
    fn test_default_validates() {
        assert!(ImpactConfig::default().validate().is_ok());
    }

    #[test]
    fn test_exposure_out_of_range() {
        let config = ImpactConfig::default().with_international_exposure(1.5);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("international_exposure"));
    }

    #[test]
    fn test_inverted_upward_band_rejected() {
        let mut thresholds = RiskThresholds::default();
        thresholds.fx = BandThresholds::new(100.0, 200.0);
        let err = ImpactConfig::default()
            .with_thresholds(thresholds)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("fx"));
    }

    #[test]
    fn test_inverted_downward_band_rejected() {
        let mut thresholds = RiskThresholds::default();
        thresholds.overall = BandThresholds::new(0.0, -10.0);
        let err = ImpactConfig::default()
            .with_thresholds(thresholds)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("overall"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ImpactConfig = toml::from_str(
            r#"
            international_exposure = 0.25

            [thresholds.fx]
            high = 2000000.0
            medium = 750000.0
            "#,
        )
        .unwrap();
        assert_eq!(config.international_exposure, 0.25);
        assert_eq!(config.thresholds.fx.high, 2_000_000.0);
        assert_eq!(config.thresholds.margin.high, -5.0);
    }
}
