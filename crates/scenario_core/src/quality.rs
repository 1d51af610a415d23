//! Data quality reports.
//!
//! A [`QualityReport`] carries the scores, detected anomalies and validation
//! check outcomes for the data feeding the baseline. Scores are percentages
//! in `0..=100`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::QualityError;

/// Severity of an anomaly or an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Needs action before the next close
    #[serde(alias = "high", alias = "HIGH")]
    High,
    /// Should be scheduled
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    /// Informational
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

/// Outcome of one validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Check passed
    Passed,
    /// Check passed with reservations
    Warning,
    /// Check failed
    Failed,
}

/// A value that differs from what was expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Entity the value belongs to, e.g. `Revenue`
    pub entity: String,
    /// Field within the entity
    pub field: String,
    /// Observed value as reported by the source
    pub value: String,
    /// Expected value
    pub expected: String,
    /// Severity
    pub severity: Severity,
    /// What is wrong
    pub description: String,
}

/// Result of one named validation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Check name
    pub check: String,
    /// Outcome
    pub status: CheckStatus,
    /// Detail
    pub description: String,
}

/// Data quality state of the reporting data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityReport {
    /// Overall score this period
    pub overall_score: f64,
    /// Overall score last period
    pub previous_score: f64,
    /// Share of required values present
    pub completeness: f64,
    /// Share of values that agree with their source
    pub accuracy: f64,
    /// Agreement between systems
    pub consistency: f64,
    /// Share of data delivered on schedule
    pub timeliness: f64,
    /// Open critical issues
    pub critical_issues: u32,
    /// Systems the data is drawn from
    pub data_sources: Vec<String>,
    /// Detected anomalies
    pub anomalies: Vec<Anomaly>,
    /// Validation check outcomes
    pub validation_results: Vec<ValidationResult>,
}

/// Headline scores with the change in overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Overall score this period
    pub overall_score: f64,
    /// Overall score last period
    pub previous_score: f64,
    /// `overall_score - previous_score`, in points
    pub overall_score_change: f64,
    /// Completeness score
    pub completeness: f64,
    /// Accuracy score
    pub accuracy: f64,
    /// Consistency score
    pub consistency: f64,
    /// Timeliness score
    pub timeliness: f64,
    /// Open critical issues
    pub critical_issues: u32,
}

impl QualityReport {
    /// Check every score is finite and within `0..=100`.
    pub fn validate(&self) -> Result<(), QualityError> {
        for (metric, value) in self.scores() {
            if !(0.0..=100.0).contains(&value) {
                return Err(QualityError::ScoreOutOfRange { metric, value });
            }
        }
        Ok(())
    }

    /// Headline scores.
    ///
    /// # Examples
    /// ```
    /// use scenario_core::quality::QualityReport;
    ///
    /// let report = QualityReport {
    ///     overall_score: 92.0,
    ///     previous_score: 87.0,
    ///     ..Default::default()
    /// };
    /// assert_eq!(report.metrics().overall_score_change, 5.0);
    /// ```
    pub fn metrics(&self) -> QualityMetrics {
        QualityMetrics {
            overall_score: self.overall_score,
            previous_score: self.previous_score,
            overall_score_change: self.overall_score - self.previous_score,
            completeness: self.completeness,
            accuracy: self.accuracy,
            consistency: self.consistency,
            timeliness: self.timeliness,
            critical_issues: self.critical_issues,
        }
    }

    /// Number of checks per outcome; outcomes with no checks are absent.
    pub fn status_counts(&self) -> BTreeMap<CheckStatus, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.validation_results {
            *counts.entry(result.status).or_insert(0) += 1;
        }
        counts
    }

    /// Checks that did not pass, failures first.
    pub fn open_checks(&self) -> Vec<&ValidationResult> {
        let mut open: Vec<_> = self
            .validation_results
            .iter()
            .filter(|r| r.status != CheckStatus::Passed)
            .collect();
        open.sort_by_key(|r| std::cmp::Reverse(r.status));
        open
    }

    /// Anomalies ordered from most to least severe, stable within a severity.
    pub fn anomalies_by_severity(&self) -> Vec<&Anomaly> {
        let mut anomalies: Vec<_> = self.anomalies.iter().collect();
        anomalies.sort_by_key(|a| a.severity);
        anomalies
    }

    fn scores(&self) -> [(&'static str, f64); 6] {
        [
            ("overall_score", self.overall_score),
            ("previous_score", self.previous_score),
            ("completeness", self.completeness),
            ("accuracy", self.accuracy),
            ("consistency", self.consistency),
            ("timeliness", self.timeliness),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, status: CheckStatus) -> ValidationResult {
        ValidationResult {
            check: name.to_string(),
            status,
            description: String::new(),
        }
    }

    fn anomaly(entity: &str, severity: Severity) -> Anomaly {
        Anomaly {
            entity: entity.to_string(),
            field: "Amount".to_string(),
            value: "1,000".to_string(),
            expected: "1,000,000".to_string(),
            severity,
            description: String::new(),
        }
    }

    fn report() -> QualityReport {
        QualityReport {
            overall_score: 92.0,
            previous_score: 87.0,
            completeness: 95.0,
            accuracy: 90.0,
            consistency: 89.0,
            timeliness: 94.0,
            critical_issues: 2,
            data_sources: vec!["ERP".to_string()],
            anomalies: vec![
                anomaly("Cost of Sales", Severity::Medium),
                anomaly("Revenue", Severity::High),
                anomaly("FX Rates", Severity::High),
            ],
            validation_results: vec![
                check("Revenue Completeness", CheckStatus::Passed),
                check("Cost Allocation", CheckStatus::Warning),
                check("Intercompany Eliminations", CheckStatus::Failed),
                check("Segment Reporting", CheckStatus::Passed),
            ],
        }
    }

    #[test]
    fn test_metrics_score_change() {
        let metrics = report().metrics();
        assert_eq!(metrics.overall_score_change, 5.0);
        assert_eq!(metrics.critical_issues, 2);
    }

    #[test]
    fn test_status_counts() {
        let counts = report().status_counts();
        assert_eq!(counts.get(&CheckStatus::Passed), Some(&2));
        assert_eq!(counts.get(&CheckStatus::Warning), Some(&1));
        assert_eq!(counts.get(&CheckStatus::Failed), Some(&1));
    }

    #[test]
    fn test_open_checks_put_failures_first() {
        let report = report();
        let open: Vec<_> = report.open_checks().iter().map(|r| r.check.as_str()).collect();
        assert_eq!(open, vec!["Intercompany Eliminations", "Cost Allocation"]);
    }

    #[test]
    fn test_anomalies_by_severity_is_stable() {
        let report = report();
        let order: Vec<_> = report
            .anomalies_by_severity()
            .iter()
            .map(|a| a.entity.as_str())
            .collect();
        assert_eq!(order, vec!["Revenue", "FX Rates", "Cost of Sales"]);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(report().validate().is_ok());

        let mut bad = report();
        bad.accuracy = 101.0;
        assert_eq!(
            bad.validate(),
            Err(QualityError::ScoreOutOfRange {
                metric: "accuracy",
                value: 101.0
            })
        );

        let mut bad = report();
        bad.timeliness = f64::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_deserialises_source_labels() {
        let json = r#"{
            "overall_score": 80,
            "anomalies": [{"entity": "Revenue", "field": "Amount", "value": "1",
                           "expected": "2", "severity": "high", "description": "x"}],
            "validation_results": [{"check": "Recon", "status": "Warning", "description": ""}]
        }"#;
        let report: QualityReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.overall_score, 80.0);
        assert_eq!(report.anomalies[0].severity, Severity::High);
        assert_eq!(report.validation_results[0].status, CheckStatus::Warning);
        assert!(report.data_sources.is_empty());
    }
}
