//! Historical analytics over per-category period amounts.

pub mod change;
pub mod profitability;
pub mod variance;

pub use change::{compare_periods, percent_change, totals_by_category, year_over_year, PeriodComparison};
pub use profitability::{period_profitability, rank_segments, PeriodProfitability, SegmentMargin};
pub use variance::{analyse_variance, significant_variances, VarianceLine, SIGNIFICANT_VARIANCE_PCT};
