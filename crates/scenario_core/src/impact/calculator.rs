//! Scenario impact calculator.
//!
//! Maps a [`FinancialBaseline`] and [`ScenarioParameters`] to a
//! [`ScenarioImpact`]. The computation is pure: identical inputs produce
//! bit-identical outputs, and nothing is read from or written to the outside.
//!
//! # Formulae
//!
//! With `R` the baseline revenue and all `*_pct` values in percent:
//!
//! | Component | Value |
//! |---|---|
//! | price | `R * price_change_pct / 100` |
//! | volume | `R * volume_change_pct / 100` |
//! | cost | `-R * cost_change_pct / 100` |
//! | fx | `R * exposure * (fx' - fx) / fx` |
//! | tax | `-(ebitda + pre_tax) * (tax' - tax) / 100` |
//!
//! `pre_tax` is the sum of the first four components and is reported as the
//! EBITDA impact. The tax component applies the rate change to the scenario
//! EBITDA, not the baseline one.

use rayon::prelude::*;

use super::config::ImpactConfig;
use super::result::ScenarioImpact;
use super::risk::RiskAssessment;
use crate::types::{FinancialBaseline, ImpactError, ScenarioParameters};

/// Calculator holding a validated [`ImpactConfig`].
///
/// # Examples
/// ```
/// use scenario_core::impact::ImpactCalculator;
/// use scenario_core::types::{FinancialBaseline, ScenarioParameters};
///
/// let baseline = FinancialBaseline::new(100_000_000.0, 17_000_000.0, 11_050_000.0, 25.0, 1.10);
/// let params = ScenarioParameters::neutral(&baseline).with_price_change(2.0);
///
/// let impact = ImpactCalculator::default().compute(&baseline, &params).unwrap();
/// assert_eq!(impact.price_impact, 2_000_000.0);
/// assert_eq!(impact.net_income_impact, 2_000_000.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactCalculator {
    config: ImpactConfig,
}

impl ImpactCalculator {
    /// Create a calculator, rejecting an inconsistent configuration.
    pub fn new(config: ImpactConfig) -> Result<Self, ImpactError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    /// Compute the impact of one scenario.
    ///
    /// # Errors
    ///
    /// - [`ImpactError::NonFiniteInput`] if any input field is NaN or infinite
    /// - [`ImpactError::DivisionUndefined`] if `baseline.fx_rate`,
    ///   `baseline.revenue`, `baseline.ebitda` or `baseline.net_income` is zero
    /// - [`ImpactError::NonFiniteResult`] if finite inputs overflow, e.g. an
    ///   extreme FX ratio
    pub fn compute(
        &self,
        baseline: &FinancialBaseline,
        params: &ScenarioParameters,
    ) -> Result<ScenarioImpact, ImpactError> {
        baseline.ensure_finite()?;
        params.ensure_finite()?;

        let revenue = baseline.revenue;

        let price_impact = revenue * params.price_change_pct / 100.0;
        let volume_impact = revenue * params.volume_change_pct / 100.0;
        let cost_impact = -revenue * params.cost_change_pct / 100.0;

        let international_exposure = revenue * self.config.international_exposure;
        let fx_rate = nonzero(baseline.fx_rate, "fx_rate")?;
        let fx_impact = international_exposure * (params.fx_rate - fx_rate) / fx_rate;

        let revenue_impact = price_impact + volume_impact;
        let pre_tax_ebitda_impact = price_impact + volume_impact + cost_impact + fx_impact;

        let tax_impact = -(baseline.ebitda + pre_tax_ebitda_impact)
            * (params.tax_rate_pct - baseline.tax_rate)
            / 100.0;

        let ebitda_impact = pre_tax_ebitda_impact;
        let net_income_impact = ebitda_impact + tax_impact;

        let revenue_impact_pct = percentage_of(revenue_impact, revenue, "revenue")?;
        let ebitda_impact_pct = percentage_of(ebitda_impact, baseline.ebitda, "ebitda")?;
        let net_income_impact_pct =
            percentage_of(net_income_impact, baseline.net_income, "net_income")?;

        ensure_finite_results(&[
            ("price_impact", price_impact),
            ("volume_impact", volume_impact),
            ("cost_impact", cost_impact),
            ("international_exposure", international_exposure),
            ("fx_impact", fx_impact),
            ("tax_impact", tax_impact),
            ("revenue_impact", revenue_impact),
            ("ebitda_impact", ebitda_impact),
            ("net_income_impact", net_income_impact),
            ("revenue_impact_pct", revenue_impact_pct),
            ("ebitda_impact_pct", ebitda_impact_pct),
            ("net_income_impact_pct", net_income_impact_pct),
            ("new_revenue", revenue + revenue_impact),
            ("new_ebitda", baseline.ebitda + ebitda_impact),
            ("new_net_income", baseline.net_income + net_income_impact),
        ])?;

        let risk_assessment = RiskAssessment::classify(
            fx_impact,
            ebitda_impact_pct,
            params.price_change_pct,
            params.volume_change_pct,
            &self.config.thresholds,
        );

        Ok(ScenarioImpact {
            price_impact,
            volume_impact,
            cost_impact,
            international_exposure,
            fx_impact,
            tax_impact,
            revenue_impact,
            ebitda_impact,
            net_income_impact,
            revenue_impact_pct,
            ebitda_impact_pct,
            net_income_impact_pct,
            base_revenue: revenue,
            base_ebitda: baseline.ebitda,
            base_net_income: baseline.net_income,
            new_revenue: revenue + revenue_impact,
            new_ebitda: baseline.ebitda + ebitda_impact,
            new_net_income: baseline.net_income + net_income_impact,
            risk_assessment,
        })
    }

    /// Compute many scenarios against one baseline in parallel.
    ///
    /// Results are returned in input order; a failing scenario does not
    /// affect the others.
    pub fn compute_batch(
        &self,
        baseline: &FinancialBaseline,
        scenarios: &[ScenarioParameters],
    ) -> Vec<Result<ScenarioImpact, ImpactError>> {
        scenarios
            .par_iter()
            .map(|params| self.compute(baseline, params))
            .collect()
    }
}

/// Compute a scenario impact with the default configuration.
pub fn compute_impact(
    baseline: &FinancialBaseline,
    params: &ScenarioParameters,
) -> Result<ScenarioImpact, ImpactError> {
    ImpactCalculator::default().compute(baseline, params)
}

fn nonzero(value: f64, metric: &'static str) -> Result<f64, ImpactError> {
    if value == 0.0 || !value.is_finite() {
        return Err(ImpactError::DivisionUndefined { metric });
    }
    Ok(value)
}

fn ensure_finite_results(values: &[(&'static str, f64)]) -> Result<(), ImpactError> {
    match values.iter().find(|(_, v)| !v.is_finite()) {
        Some(&(field, _)) => Err(ImpactError::NonFiniteResult { field }),
        None => Ok(()),
    }
}

/// `value / base * 100`, undefined for a zero base.
pub(crate) fn percentage_of(
    value: f64,
    base: f64,
    metric: &'static str,
) -> Result<f64, ImpactError> {
    let base = nonzero(base, metric)?;
    Ok(value / base * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::risk::RiskBand;
    use approx::assert_relative_eq;

    fn baseline() -> FinancialBaseline {
        FinancialBaseline::new(100_000_000.0, 17_000_000.0, 11_050_000.0, 25.0, 1.10)
    }

    #[test]
    fn test_reference_price_case() {
        let params = ScenarioParameters::neutral(&baseline()).with_price_change(2.0);
        let impact = compute_impact(&baseline(), &params).unwrap();

        assert_eq!(impact.price_impact, 2_000_000.0);
        assert_eq!(impact.volume_impact, 0.0);
        assert_eq!(impact.fx_impact, 0.0);
        assert_eq!(impact.tax_impact, 0.0);
        assert_eq!(impact.revenue_impact, 2_000_000.0);
        assert_eq!(impact.ebitda_impact, 2_000_000.0);
        assert_eq!(impact.net_income_impact, 2_000_000.0);
        assert_relative_eq!(impact.revenue_impact_pct, 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            impact.ebitda_impact_pct,
            2_000_000.0 / 17_000_000.0 * 100.0,
            epsilon = 1e-12
        );
        assert_eq!(impact.risk_assessment.overall, RiskBand::Low);
    }

    #[test]
    fn test_neutral_is_zero() {
        let impact = compute_impact(&baseline(), &ScenarioParameters::neutral(&baseline())).unwrap();
        assert_eq!(impact.price_impact, 0.0);
        assert_eq!(impact.cost_impact, 0.0);
        assert_eq!(impact.fx_impact, 0.0);
        assert_eq!(impact.tax_impact, 0.0);
        assert_eq!(impact.net_income_impact, 0.0);
        assert_eq!(impact.risk_assessment.margin, RiskBand::Low);
        assert_eq!(impact.risk_assessment.overall, RiskBand::Low);
        assert_eq!(impact.new_revenue, impact.base_revenue);
    }

    #[test]
    fn test_cost_increase_reduces_ebitda() {
        let params = ScenarioParameters::neutral(&baseline()).with_cost_change(3.0);
        let impact = compute_impact(&baseline(), &params).unwrap();
        assert_eq!(impact.cost_impact, -3_000_000.0);
        assert_eq!(impact.revenue_impact, 0.0);
        assert_eq!(impact.ebitda_impact, -3_000_000.0);
        // -17.6% EBITDA
        assert_eq!(impact.risk_assessment.margin, RiskBand::High);
        assert_eq!(impact.risk_assessment.overall, RiskBand::High);
    }

    #[test]
    fn test_fx_move() {
        let params = ScenarioParameters::neutral(&baseline()).with_fx_rate(1.21);
        let impact = compute_impact(&baseline(), &params).unwrap();
        // 40M exposure, 10% move
        assert_relative_eq!(impact.international_exposure, 40_000_000.0);
        assert_relative_eq!(impact.fx_impact, 4_000_000.0, max_relative = 1e-12);
        assert_eq!(impact.risk_assessment.fx, RiskBand::High);
        assert_eq!(impact.revenue_impact, 0.0);
    }

    #[test]
    fn test_tax_applies_to_scenario_ebitda() {
        let params = ScenarioParameters::neutral(&baseline())
            .with_price_change(2.0)
            .with_tax_rate(30.0);
        let impact = compute_impact(&baseline(), &params).unwrap();
        // -(17M + 2M) * 5 / 100
        assert_relative_eq!(impact.tax_impact, -950_000.0, max_relative = 1e-12);
        assert_relative_eq!(impact.net_income_impact, 1_050_000.0, max_relative = 1e-12);
        assert_eq!(impact.ebitda_impact, 2_000_000.0);
    }

    #[test]
    fn test_zero_denominators_are_errors() {
        let params = ScenarioParameters::default();

        let mut b = baseline();
        b.ebitda = 0.0;
        assert_eq!(
            compute_impact(&b, &params),
            Err(ImpactError::DivisionUndefined { metric: "ebitda" })
        );

        let mut b = baseline();
        b.net_income = 0.0;
        assert_eq!(
            compute_impact(&b, &params),
            Err(ImpactError::DivisionUndefined {
                metric: "net_income"
            })
        );

        let mut b = baseline();
        b.revenue = 0.0;
        assert_eq!(
            compute_impact(&b, &params),
            Err(ImpactError::DivisionUndefined { metric: "revenue" })
        );

        let mut b = baseline();
        b.fx_rate = 0.0;
        assert_eq!(
            compute_impact(&b, &params),
            Err(ImpactError::DivisionUndefined { metric: "fx_rate" })
        );
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let params = ScenarioParameters::default().with_price_change(f64::NAN);
        assert_eq!(
            compute_impact(&baseline(), &params),
            Err(ImpactError::NonFiniteInput {
                field: "price_change_pct"
            })
        );
    }

    #[test]
    fn test_overflowing_result_rejected() {
        let mut b = baseline();
        b.fx_rate = 1e-300;
        let params = ScenarioParameters::neutral(&b).with_fx_rate(1e10);
        assert_eq!(
            compute_impact(&b, &params),
            Err(ImpactError::NonFiniteResult { field: "fx_impact" })
        );

        let params = ScenarioParameters::neutral(&baseline()).with_price_change(f64::MAX);
        assert_eq!(
            compute_impact(&baseline(), &params),
            Err(ImpactError::NonFiniteResult {
                field: "price_impact"
            })
        );
    }

    #[test]
    fn test_negative_ebitda_baseline_is_allowed() {
        let b = FinancialBaseline::new(50_000_000.0, -2_000_000.0, -3_000_000.0, 25.0, 1.10);
        let params = ScenarioParameters::neutral(&b).with_price_change(1.0);
        let impact = compute_impact(&b, &params).unwrap();
        assert_eq!(impact.ebitda_impact, 500_000.0);
        assert_relative_eq!(impact.ebitda_impact_pct, -25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_custom_exposure() {
        let config = ImpactConfig::default().with_international_exposure(0.0);
        let calc = ImpactCalculator::new(config).unwrap();
        let params = ScenarioParameters::neutral(&baseline()).with_fx_rate(2.0);
        let impact = calc.compute(&baseline(), &params).unwrap();
        assert_eq!(impact.fx_impact, 0.0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ImpactConfig::default().with_international_exposure(-0.1);
        assert!(matches!(
            ImpactCalculator::new(config),
            Err(ImpactError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_batch_preserves_order_and_isolates_errors() {
        let calc = ImpactCalculator::default();
        let scenarios = vec![
            ScenarioParameters::neutral(&baseline()).with_price_change(1.0),
            ScenarioParameters::neutral(&baseline()).with_volume_change(f64::INFINITY),
            ScenarioParameters::neutral(&baseline()).with_price_change(3.0),
        ];
        let results = calc.compute_batch(&baseline(), &scenarios);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().price_impact, 1_000_000.0);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().price_impact, 3_000_000.0);
    }

    #[test]
    fn test_bridge_reconciles() {
        let params = ScenarioParameters::neutral(&baseline())
            .with_price_change(2.0)
            .with_volume_change(-1.0)
            .with_cost_change(0.5)
            .with_fx_rate(1.05)
            .with_tax_rate(28.0);
        let impact = compute_impact(&baseline(), &params).unwrap();
        let bridge = impact.bridge();
        assert_eq!(bridge.steps.len(), 8);
        assert_eq!(bridge.steps[0].label, "Base EBITDA");
        assert!(bridge.reconciles(1e-6));
        assert!(bridge.largest_drag().is_some());
    }

    #[test]
    fn test_outlook_follows_ebitda_pct() {
        use crate::impact::ScenarioOutlook;
        let up = ScenarioParameters::neutral(&baseline()).with_price_change(5.0);
        assert_eq!(
            compute_impact(&baseline(), &up).unwrap().outlook(),
            ScenarioOutlook::Favourable
        );
        let flat = ScenarioParameters::neutral(&baseline()).with_price_change(0.5);
        assert_eq!(
            compute_impact(&baseline(), &flat).unwrap().outlook(),
            ScenarioOutlook::Moderate
        );
    }
}
