//! Period-over-period change by category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{AmountRecord, FiscalQuarter, ImpactError};

/// Relative change from `previous` to `current`, in percent.
///
/// # Errors
///
/// [`ImpactError::DivisionUndefined`] if `previous` is zero or non-finite.
///
/// # Examples
/// ```
/// use scenario_core::analysis::percent_change;
///
/// assert_eq!(percent_change(110.0, 100.0).unwrap(), 10.0);
/// assert!(percent_change(5.0, 0.0).is_err());
/// ```
pub fn percent_change(current: f64, previous: f64) -> Result<f64, ImpactError> {
    if previous == 0.0 || !previous.is_finite() {
        return Err(ImpactError::DivisionUndefined { metric: "previous" });
    }
    Ok((current - previous) / previous * 100.0)
}

/// Change of one category between two periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    /// Category name
    pub category: String,
    /// Total in the current period
    pub current: f64,
    /// Total in the previous period
    pub previous: f64,
    /// `current - previous`
    pub change: f64,
    /// Relative change; `None` when the previous total is zero
    pub percent_change: Option<f64>,
}

/// Sum amounts per category for one period.
pub fn totals_by_category(records: &[AmountRecord], period: FiscalQuarter) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for record in records.iter().filter(|r| r.period == period) {
        *totals.entry(record.category.clone()).or_insert(0.0) += record.amount;
    }
    totals
}

/// Compare category totals between two periods.
///
/// Only categories present in both periods are reported, sorted by name.
pub fn compare_periods(
    records: &[AmountRecord],
    current: FiscalQuarter,
    previous: FiscalQuarter,
) -> Vec<PeriodComparison> {
    let current_totals = totals_by_category(records, current);
    let previous_totals = totals_by_category(records, previous);

    current_totals
        .into_iter()
        .filter_map(|(category, cur)| {
            let prev = *previous_totals.get(&category)?;
            Some(PeriodComparison {
                category,
                current: cur,
                previous: prev,
                change: cur - prev,
                percent_change: percent_change(cur, prev).ok(),
            })
        })
        .collect()
}

/// Year-over-year comparison for `period` against the same quarter a year earlier.
///
/// Empty when there is no earlier year to compare with.
pub fn year_over_year(records: &[AmountRecord], period: FiscalQuarter) -> Vec<PeriodComparison> {
    match period.year_ago() {
        Some(previous) => compare_periods(records, period, previous),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(label: &str) -> FiscalQuarter {
        label.parse().unwrap()
    }

    fn records() -> Vec<AmountRecord> {
        vec![
            AmountRecord::new(q("2023-Q2"), "Hardware", 120.0),
            AmountRecord::new(q("2023-Q2"), "Hardware", 30.0),
            AmountRecord::new(q("2023-Q2"), "Software", 80.0),
            AmountRecord::new(q("2023-Q2"), "Cloud", 50.0),
            AmountRecord::new(q("2022-Q2"), "Hardware", 100.0),
            AmountRecord::new(q("2022-Q2"), "Software", 0.0),
            AmountRecord::new(q("2022-Q2"), "Consulting", 40.0),
            AmountRecord::new(q("2023-Q1"), "Hardware", 999.0),
        ]
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(90.0, 100.0).unwrap(), -10.0);
        assert_eq!(percent_change(-50.0, -100.0).unwrap(), -50.0);
        assert_eq!(
            percent_change(1.0, 0.0),
            Err(ImpactError::DivisionUndefined { metric: "previous" })
        );
    }

    #[test]
    fn test_totals_by_category() {
        let totals = totals_by_category(&records(), q("2023-Q2"));
        assert_eq!(totals.get("Hardware"), Some(&150.0));
        assert_eq!(totals.len(), 3);
    }

    #[test]
    fn test_compare_periods_inner_join_sorted() {
        let rows = year_over_year(&records(), q("2023-Q2"));
        let names: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Hardware", "Software"]);

        assert_eq!(rows[0].current, 150.0);
        assert_eq!(rows[0].previous, 100.0);
        assert_eq!(rows[0].change, 50.0);
        assert_eq!(rows[0].percent_change, Some(50.0));

        assert_eq!(rows[1].change, 80.0);
        assert_eq!(rows[1].percent_change, None);
    }

    #[test]
    fn test_year_over_year_without_earlier_year_is_empty() {
        assert!(year_over_year(&records(), q("1000-Q2")).is_empty());
    }

    #[test]
    fn test_compare_empty_periods() {
        assert!(compare_periods(&records(), q("2019-Q1"), q("2018-Q1")).is_empty());
    }
}
