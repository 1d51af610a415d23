//! Error types for structured error handling.
//!
//! This module provides:
//! - `ImpactError`: Errors from scenario impact and period analytics
//! - `ForecastError`: Errors from revenue projection
//! - `BaselineError`: Errors from converting metric snapshots into a baseline
//! - `QualityError`: Errors from inconsistent data quality reports
//! - `PeriodParseError`: Errors from parsing fiscal quarter labels

use thiserror::Error;

/// Errors that can occur while computing scenario impacts.
///
/// # Examples
/// ```
/// use scenario_core::types::ImpactError;
///
/// let err = ImpactError::DivisionUndefined { metric: "ebitda" };
/// assert_eq!(
///     format!("{}", err),
///     "Division undefined: baseline ebitda is zero or non-finite"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpactError {
    /// A percentage or ratio denominator was zero or non-finite.
    #[error("Division undefined: baseline {metric} is zero or non-finite")]
    DivisionUndefined {
        /// Name of the metric used as denominator.
        metric: &'static str,
    },

    /// An input value was NaN or infinite.
    #[error("Non-finite input: {field}")]
    NonFiniteInput {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A computed value overflowed to infinity or became NaN.
    #[error("Non-finite result: {field} overflowed for the given inputs")]
    NonFiniteResult {
        /// Name of the first offending output.
        field: &'static str,
    },

    /// Calculator configuration is inconsistent.
    #[error("Invalid impact configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that can occur during revenue projection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    /// A projection parameter is out of range or non-finite.
    #[error("Invalid forecast parameter: {0}")]
    InvalidParameter(String),

    /// The noise distribution could not be constructed.
    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Errors that can occur when deriving a baseline from a metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BaselineError {
    /// A required metric is absent from the snapshot.
    #[error("Missing metric in {period} period: {metric}")]
    MissingMetric {
        /// `current` or `previous`.
        period: &'static str,
        /// Metric key.
        metric: String,
    },

    /// Growth could not be computed.
    #[error(transparent)]
    Impact(#[from] ImpactError),
}

/// Errors found when checking a data quality report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QualityError {
    /// A score lies outside `0..=100` or is not finite.
    #[error("Quality score {metric} must be within 0..=100, got {value}")]
    ScoreOutOfRange {
        /// Score name.
        metric: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Error parsing a `YYYY-Qn` label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid fiscal quarter '{0}': expected YYYY-Qn with n in 1..=4")]
pub struct PeriodParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_division_undefined() {
        let err = ImpactError::DivisionUndefined { metric: "revenue" };
        assert_eq!(
            format!("{}", err),
            "Division undefined: baseline revenue is zero or non-finite"
        );
    }

    #[test]
    fn test_error_display_non_finite() {
        let err = ImpactError::NonFiniteInput {
            field: "price_change_pct",
        };
        assert_eq!(format!("{}", err), "Non-finite input: price_change_pct");
    }

    #[test]
    fn test_baseline_error_wraps_impact_error() {
        let err: BaselineError = ImpactError::DivisionUndefined { metric: "revenue" }.into();
        assert!(err.to_string().contains("revenue"));
    }

    #[test]
    fn test_period_parse_error_display() {
        let err = PeriodParseError("2023-Q5".to_string());
        assert!(err.to_string().contains("2023-Q5"));
    }

    #[test]
    fn test_quality_error_display() {
        let err = QualityError::ScoreOutOfRange {
            metric: "accuracy",
            value: 120.0,
        };
        assert_eq!(
            err.to_string(),
            "Quality score accuracy must be within 0..=100, got 120"
        );
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: Box<dyn std::error::Error> =
            Box::new(ForecastError::InvalidParameter("growth".to_string()));
        assert!(err.to_string().contains("growth"));
    }
}
