//! Current and previous period metrics, and their conversion into a baseline.
//!
//! A [`BaselineSource`] supplies a [`MetricsSnapshot`]; the snapshot knows how
//! to produce the [`FinancialBaseline`] the calculator needs and how to report
//! year-over-year growth of any metric it carries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::percent_change;
use crate::types::{BaselineError, FinancialBaseline, DEFAULT_FX_RATE, DEFAULT_TAX_RATE_PCT};

/// Metric key for revenue.
pub const REVENUE: &str = "revenue";
/// Metric key for EBITDA.
pub const EBITDA: &str = "ebitda";
/// Metric key for net income.
pub const NET_INCOME: &str = "net_income";
/// Metric key for the tax rate in percent.
pub const TAX_RATE: &str = "tax_rate";
/// Metric key for the FX rate.
pub const FX_RATE: &str = "fx_rate";

/// Named metrics for the current and the previous period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSnapshot {
    /// Current period metrics
    pub current: BTreeMap<String, f64>,
    /// Same period one year earlier
    pub previous: BTreeMap<String, f64>,
    /// Free-text description of market conditions
    pub market_conditions: Option<String>,
}

impl MetricsSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a current-period metric.
    pub fn with_current(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.current.insert(metric.into(), value);
        self
    }

    /// Add a previous-period metric.
    pub fn with_previous(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.previous.insert(metric.into(), value);
        self
    }

    /// Set the market conditions note.
    pub fn with_market_conditions(mut self, note: impl Into<String>) -> Self {
        self.market_conditions = Some(note.into());
        self
    }

    fn required(
        map: &BTreeMap<String, f64>,
        period: &'static str,
        metric: &str,
    ) -> Result<f64, BaselineError> {
        map.get(metric)
            .copied()
            .ok_or_else(|| BaselineError::MissingMetric {
                period,
                metric: metric.to_string(),
            })
    }

    /// Current value of a metric.
    pub fn current_value(&self, metric: &str) -> Result<f64, BaselineError> {
        Self::required(&self.current, "current", metric)
    }

    /// Previous value of a metric.
    pub fn previous_value(&self, metric: &str) -> Result<f64, BaselineError> {
        Self::required(&self.previous, "previous", metric)
    }

    /// Baseline for the calculator.
    ///
    /// Revenue, EBITDA and net income are required; tax and FX rates fall back
    /// to [`DEFAULT_TAX_RATE_PCT`] and [`DEFAULT_FX_RATE`].
    pub fn to_baseline(&self) -> Result<FinancialBaseline, BaselineError> {
        Ok(FinancialBaseline::new(
            self.current_value(REVENUE)?,
            self.current_value(EBITDA)?,
            self.current_value(NET_INCOME)?,
            self.current.get(TAX_RATE).copied().unwrap_or(DEFAULT_TAX_RATE_PCT),
            self.current.get(FX_RATE).copied().unwrap_or(DEFAULT_FX_RATE),
        ))
    }

    /// Year-over-year growth of a metric, in percent.
    pub fn yoy_growth(&self, metric: &str) -> Result<f64, BaselineError> {
        let current = self.current_value(metric)?;
        let previous = self.previous_value(metric)?;
        Ok(percent_change(current, previous)?)
    }

    /// Growth of every metric present in both periods with a non-zero previous value.
    pub fn growth_table(&self) -> BTreeMap<String, f64> {
        self.current
            .keys()
            .filter_map(|metric| {
                self.yoy_growth(metric)
                    .ok()
                    .map(|growth| (metric.clone(), growth))
            })
            .collect()
    }
}

/// Supplier of period metrics.
///
/// Implementations may read from a planning system, a warehouse or static
/// configuration.
pub trait BaselineSource: Send + Sync {
    /// Short name used in logs and health output.
    fn name(&self) -> &str;

    /// Fetch the latest snapshot.
    fn snapshot(&self) -> Result<MetricsSnapshot, BaselineError>;
}

/// A source returning a fixed snapshot.
#[derive(Debug, Clone)]
pub struct StaticBaselineSource {
    snapshot: MetricsSnapshot,
}

impl StaticBaselineSource {
    /// Wrap a snapshot.
    pub fn new(snapshot: MetricsSnapshot) -> Self {
        Self { snapshot }
    }
}

impl BaselineSource for StaticBaselineSource {
    fn name(&self) -> &str {
        "static"
    }

    fn snapshot(&self) -> Result<MetricsSnapshot, BaselineError> {
        Ok(self.snapshot.clone())
    }
}
