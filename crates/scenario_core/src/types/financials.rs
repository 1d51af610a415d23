//! Baseline snapshot and scenario adjustment parameters.

use serde::{Deserialize, Serialize};

use super::error::ImpactError;

/// Default FX rate used when no baseline is supplied (EUR/USD).
pub const DEFAULT_FX_RATE: f64 = 1.10;

/// Default corporate tax rate in percent.
pub const DEFAULT_TAX_RATE_PCT: f64 = 25.0;

/// Current-period actual figures used as the reference point for scenario deltas.
///
/// All currency amounts share one unit. `tax_rate` is expressed in percent
/// (25.0 means 25%).
///
/// # Examples
/// ```
/// use scenario_core::types::FinancialBaseline;
///
/// let baseline = FinancialBaseline::new(100_000_000.0, 17_000_000.0, 11_050_000.0, 25.0, 1.10);
/// let margin = baseline.ebitda_margin_pct().unwrap();
/// assert!((margin - 17.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialBaseline {
    /// Period revenue
    pub revenue: f64,
    /// Period EBITDA
    pub ebitda: f64,
    /// Period net income
    pub net_income: f64,
    /// Effective tax rate in percent
    pub tax_rate: f64,
    /// FX rate of the foreign-currency exposure
    pub fx_rate: f64,
}

impl FinancialBaseline {
    /// Create a new baseline.
    pub fn new(revenue: f64, ebitda: f64, net_income: f64, tax_rate: f64, fx_rate: f64) -> Self {
        Self {
            revenue,
            ebitda,
            net_income,
            tax_rate,
            fx_rate,
        }
    }

    /// EBITDA as a percentage of revenue.
    pub fn ebitda_margin_pct(&self) -> Result<f64, ImpactError> {
        if self.revenue == 0.0 || !self.revenue.is_finite() {
            return Err(ImpactError::DivisionUndefined { metric: "revenue" });
        }
        Ok(self.ebitda / self.revenue * 100.0)
    }

    /// Reject NaN and infinite fields.
    pub fn ensure_finite(&self) -> Result<(), ImpactError> {
        let fields = [
            ("revenue", self.revenue),
            ("ebitda", self.ebitda),
            ("net_income", self.net_income),
            ("tax_rate", self.tax_rate),
            ("fx_rate", self.fx_rate),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((field, _)) => Err(ImpactError::NonFiniteInput { field: *field }),
            None => Ok(()),
        }
    }
}

/// Scalar adjustments applied to a baseline.
///
/// The three `*_change_pct` fields are relative changes in percent and are not
/// range-checked. `fx_rate` and `tax_rate_pct` are absolute values that replace
/// the baseline ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    /// Price change in percent
    #[serde(default)]
    pub price_change_pct: f64,
    /// Volume change in percent
    #[serde(default)]
    pub volume_change_pct: f64,
    /// Cost change in percent of revenue
    #[serde(default)]
    pub cost_change_pct: f64,
    /// Scenario FX rate
    #[serde(default = "default_fx_rate")]
    pub fx_rate: f64,
    /// Scenario tax rate in percent
    #[serde(default = "default_tax_rate")]
    pub tax_rate_pct: f64,
}

fn default_fx_rate() -> f64 {
    DEFAULT_FX_RATE
}

fn default_tax_rate() -> f64 {
    DEFAULT_TAX_RATE_PCT
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            price_change_pct: 0.0,
            volume_change_pct: 0.0,
            cost_change_pct: 0.0,
            fx_rate: DEFAULT_FX_RATE,
            tax_rate_pct: DEFAULT_TAX_RATE_PCT,
        }
    }
}

impl ScenarioParameters {
    /// Parameters that leave the baseline unchanged.
    pub fn neutral(baseline: &FinancialBaseline) -> Self {
        Self {
            price_change_pct: 0.0,
            volume_change_pct: 0.0,
            cost_change_pct: 0.0,
            fx_rate: baseline.fx_rate,
            tax_rate_pct: baseline.tax_rate,
        }
    }

    /// Set the price change.
    pub fn with_price_change(mut self, pct: f64) -> Self {
        self.price_change_pct = pct;
        self
    }

    /// Set the volume change.
    pub fn with_volume_change(mut self, pct: f64) -> Self {
        self.volume_change_pct = pct;
        self
    }

    /// Set the cost change.
    pub fn with_cost_change(mut self, pct: f64) -> Self {
        self.cost_change_pct = pct;
        self
    }

    /// Set the scenario FX rate.
    pub fn with_fx_rate(mut self, fx_rate: f64) -> Self {
        self.fx_rate = fx_rate;
        self
    }

    /// Set the scenario tax rate.
    pub fn with_tax_rate(mut self, tax_rate_pct: f64) -> Self {
        self.tax_rate_pct = tax_rate_pct;
        self
    }

    /// Reject NaN and infinite fields.
    pub fn ensure_finite(&self) -> Result<(), ImpactError> {
        let fields = [
            ("price_change_pct", self.price_change_pct),
            ("volume_change_pct", self.volume_change_pct),
            ("cost_change_pct", self.cost_change_pct),
            ("fx_rate", self.fx_rate),
            ("tax_rate_pct", self.tax_rate_pct),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((field, _)) => Err(ImpactError::NonFiniteInput { field: *field }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> FinancialBaseline {
        FinancialBaseline::new(100_000_000.0, 17_000_000.0, 11_050_000.0, 25.0, 1.10)
    }

    #[test]
    fn test_neutral_parameters_copy_baseline_rates() {
        let params = ScenarioParameters::neutral(&baseline());
        assert_eq!(params.fx_rate, 1.10);
        assert_eq!(params.tax_rate_pct, 25.0);
        assert_eq!(params.price_change_pct, 0.0);
    }

    #[test]
    fn test_builder_chain() {
        let params = ScenarioParameters::default()
            .with_price_change(2.0)
            .with_volume_change(-3.0)
            .with_cost_change(1.5)
            .with_fx_rate(1.2)
            .with_tax_rate(30.0);
        assert_eq!(params.price_change_pct, 2.0);
        assert_eq!(params.volume_change_pct, -3.0);
        assert_eq!(params.cost_change_pct, 1.5);
        assert_eq!(params.fx_rate, 1.2);
        assert_eq!(params.tax_rate_pct, 30.0);
    }

    #[test]
    fn test_ebitda_margin_zero_revenue() {
        let mut b = baseline();
        b.revenue = 0.0;
        assert_eq!(
            b.ebitda_margin_pct(),
            Err(ImpactError::DivisionUndefined { metric: "revenue" })
        );
    }

    #[test]
    fn test_ensure_finite_reports_field() {
        let params = ScenarioParameters::default().with_volume_change(f64::NAN);
        assert_eq!(
            params.ensure_finite(),
            Err(ImpactError::NonFiniteInput {
                field: "volume_change_pct"
            })
        );

        let mut b = baseline();
        b.net_income = f64::INFINITY;
        assert_eq!(
            b.ensure_finite(),
            Err(ImpactError::NonFiniteInput { field: "net_income" })
        );
    }

    #[test]
    fn test_parameters_deserialize_with_defaults() {
        let params: ScenarioParameters =
            serde_json::from_str(r#"{"price_change_pct": 3.0}"#).unwrap();
        assert_eq!(params.price_change_pct, 3.0);
        assert_eq!(params.fx_rate, DEFAULT_FX_RATE);
        assert_eq!(params.tax_rate_pct, DEFAULT_TAX_RATE_PCT);
    }
}
