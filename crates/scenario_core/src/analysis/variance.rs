//! Actual versus forecast variance.

use serde::{Deserialize, Serialize};

use super::change::totals_by_category;
use crate::types::{AmountRecord, FiscalQuarter};

/// Absolute variance % above which a line is reported as significant.
pub const SIGNIFICANT_VARIANCE_PCT: f64 = 5.0;

/// Variance of one category in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceLine {
    /// Category name
    pub category: String,
    /// Forecast total
    pub forecast: f64,
    /// Actual total
    pub actual: f64,
    /// `actual - forecast`
    pub variance: f64,
    /// Variance in percent of forecast, `0.0` when the forecast is zero
    pub variance_pct: f64,
}

impl VarianceLine {
    /// Build a line from the two totals.
    pub fn new(category: impl Into<String>, actual: f64, forecast: f64) -> Self {
        let variance = actual - forecast;
        let variance_pct = if forecast != 0.0 {
            variance / forecast * 100.0
        } else {
            0.0
        };
        Self {
            category: category.into(),
            forecast,
            actual,
            variance,
            variance_pct,
        }
    }

    /// Whether `|variance_pct|` exceeds `threshold_pct`.
    pub fn is_significant(&self, threshold_pct: f64) -> bool {
        self.variance_pct.abs() > threshold_pct
    }
}

/// Compare actuals with forecasts for one period.
///
/// Categories need both an actual and a forecast total; output is sorted by
/// category.
pub fn analyse_variance(
    actuals: &[AmountRecord],
    forecasts: &[AmountRecord],
    period: FiscalQuarter,
) -> Vec<VarianceLine> {
    let actual_totals = totals_by_category(actuals, period);
    let forecast_totals = totals_by_category(forecasts, period);

    forecast_totals
        .into_iter()
        .filter_map(|(category, forecast)| {
            let actual = *actual_totals.get(&category)?;
            Some(VarianceLine::new(category, actual, forecast))
        })
        .collect()
}

/// Lines whose variance exceeds `threshold_pct` in either direction.
pub fn significant_variances(lines: &[VarianceLine], threshold_pct: f64) -> Vec<&VarianceLine> {
    lines
        .iter()
        .filter(|line| line.is_significant(threshold_pct))
        .collect()
}
