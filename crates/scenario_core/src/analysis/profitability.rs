//! Period and segment profitability.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::change::percent_change;
use crate::types::{AmountRecord, FiscalQuarter};

/// Revenue and cost totals of one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodProfitability {
    /// Reporting period
    pub period: FiscalQuarter,
    /// Total revenue
    pub revenue: f64,
    /// Total cost
    pub cost: f64,
    /// `revenue - cost`
    pub gross_profit: f64,
    /// Gross profit in percent of revenue; `None` for zero revenue
    pub gross_margin_pct: Option<f64>,
    /// Revenue growth against the preceding reported period
    pub revenue_growth_pct: Option<f64>,
}

fn totals_by_period(records: &[AmountRecord]) -> BTreeMap<FiscalQuarter, f64> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.period).or_insert(0.0) += record.amount;
    }
    totals
}

/// Profitability per period, in chronological order.
///
/// Periods need both revenue and cost records. Growth is measured against the
/// preceding reported period and is absent for the first one.
pub fn period_profitability(
    revenue: &[AmountRecord],
    costs: &[AmountRecord],
) -> Vec<PeriodProfitability> {
    let revenue_totals = totals_by_period(revenue);
    let cost_totals = totals_by_period(costs);

    let mut previous_revenue: Option<f64> = None;
    let mut rows = Vec::new();

    for (period, rev) in revenue_totals {
        let growth = previous_revenue.and_then(|prev| percent_change(rev, prev).ok());
        previous_revenue = Some(rev);

        let Some(&cost) = cost_totals.get(&period) else {
            continue;
        };
        let gross_profit = rev - cost;
        rows.push(PeriodProfitability {
            period,
            revenue: rev,
            cost,
            gross_profit,
            gross_margin_pct: (rev != 0.0).then(|| gross_profit / rev * 100.0),
            revenue_growth_pct: growth,
        });
    }
    rows
}

/// Revenue and cost of a product, region or other segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMargin {
    /// Segment name
    pub name: String,
    /// Segment revenue
    pub revenue: f64,
    /// Segment cost
    pub cost: f64,
    /// `revenue - cost`
    pub profit: f64,
    /// Profit in percent of revenue; zero for zero revenue
    pub margin_pct: f64,
}

impl SegmentMargin {
    /// Build a segment from revenue and cost.
    pub fn new(name: impl Into<String>, revenue: f64, cost: f64) -> Self {
        let profit = revenue - cost;
        let margin_pct = if revenue != 0.0 {
            profit / revenue * 100.0
        } else {
            0.0
        };
        Self {
            name: name.into(),
            revenue,
            cost,
            profit,
            margin_pct,
        }
    }
}

/// The `n` best (or, with `worst_first`, worst) segments by margin.
pub fn rank_segments(segments: &[SegmentMargin], n: usize, worst_first: bool) -> Vec<SegmentMargin> {
    let mut ranked = segments.to_vec();
    ranked.sort_by(|a, b| {
        let ord = a.margin_pct.total_cmp(&b.margin_pct);
        if worst_first {
            ord
        } else {
            ord.reverse()
        }
    });
    ranked.truncate(n);
    ranked
}
