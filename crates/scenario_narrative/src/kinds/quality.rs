//! Data quality action plan.
//!
//! The fallback is built from the report: anomalies become priority issues
//! and every check that did not pass becomes an action item.

use chrono::NaiveDate;
use scenario_core::quality::{
    Anomaly, CheckStatus, QualityMetrics, QualityReport, Severity, ValidationResult,
};
use serde::{Deserialize, Serialize};

use crate::generator::{GenerationRequest, TextGenerator};
use crate::narrative::{generate_or_fallback, Narrative};

/// Owner given to action items derived from failed checks.
pub const DEFAULT_ACTION_OWNER: &str = "Data Governance";

/// Figures the action plan is written from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityContext {
    /// Headline scores
    pub metrics: QualityMetrics,
    /// Number of anomalies
    pub anomalies_count: usize,
    /// Systems the data is drawn from
    pub data_sources: Vec<String>,
    /// Anomalies, most severe first
    pub anomalies: Vec<Anomaly>,
    /// Checks that did not pass, failures first
    pub open_checks: Vec<ValidationResult>,
}

impl QualityContext {
    /// Build the context from a report.
    pub fn from_report(report: &QualityReport) -> Self {
        Self {
            metrics: report.metrics(),
            anomalies_count: report.anomalies.len(),
            data_sources: report.data_sources.clone(),
            anomalies: report.anomalies_by_severity().into_iter().cloned().collect(),
            open_checks: report.open_checks().into_iter().cloned().collect(),
        }
    }
}

/// An issue to fix, in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityIssue {
    /// Short name
    pub title: String,
    /// Severity
    pub severity: Severity,
    /// Effect on reporting
    pub impact: String,
    /// How to resolve it
    pub resolution: String,
}

/// A scheduled remediation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    /// Short name
    pub title: String,
    /// Responsible team
    pub owner: String,
    /// Priority
    pub priority: Severity,
    /// What to do
    pub description: String,
    /// Result once done
    #[serde(default)]
    pub expected_outcome: String,
    /// Planned start
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Planned completion
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Data quality analysis with a remediation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityActionPlan {
    /// Three to four sentences
    pub executive_summary: String,
    /// Issues in priority order
    #[serde(default)]
    pub priority_issues: Vec<PriorityIssue>,
    /// Remediation steps
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    /// Effect of the plan on the reporting timeline
    #[serde(default)]
    pub timeline_impact: String,
}

impl QualityActionPlan {
    /// Deterministic plan built from the report figures.
    pub fn from_context(context: &QualityContext) -> Self {
        let metrics = &context.metrics;

        let priority_issues = context
            .anomalies
            .iter()
            .map(|a| PriorityIssue {
                title: format!("{} {}", a.entity, a.field),
                severity: a.severity,
                impact: a.description.clone(),
                resolution: format!("Correct {} to the expected {} at source", a.value, a.expected),
            })
            .collect();

        let action_items = context
            .open_checks
            .iter()
            .map(|check| ActionItem {
                title: format!("Resolve {}", check.check),
                owner: DEFAULT_ACTION_OWNER.to_string(),
                priority: match check.status {
                    CheckStatus::Failed => Severity::High,
                    _ => Severity::Medium,
                },
                description: check.description.clone(),
                expected_outcome: format!("{} check passes", check.check),
                start_date: None,
                due_date: None,
            })
            .collect();

        let timeline_impact = if metrics.critical_issues > 0 {
            format!(
                "Clearing the {} critical issue(s) before the close removes the manual \
                 corrections they currently require.",
                metrics.critical_issues
            )
        } else {
            "No critical issues are open, so data quality does not put the close timeline \
             at risk."
                .to_string()
        };

        Self {
            executive_summary: format!(
                "Overall data quality scores {:.0} ({:+.0} points on the previous period). \
                 {} anomalies and {} open validation check(s) were found; completeness is \
                 {:.0}, accuracy {:.0} and consistency {:.0}.",
                metrics.overall_score,
                metrics.overall_score_change,
                context.anomalies_count,
                context.open_checks.len(),
                metrics.completeness,
                metrics.accuracy,
                metrics.consistency
            ),
            priority_issues,
            action_items,
            timeline_impact,
        }
    }

    /// Action items with high priority.
    pub fn high_priority_actions(&self) -> Vec<&ActionItem> {
        self.action_items
            .iter()
            .filter(|a| a.priority == Severity::High)
            .collect()
    }
}

/// Prompt asking for a [`QualityActionPlan`].
pub fn quality_prompt(context: &QualityContext) -> GenerationRequest {
    let data = serde_json::to_string_pretty(context).unwrap_or_default();
    GenerationRequest::json(format!(
        "You are a data quality specialist. Analyse the data quality figures below and produce:\n\
         1. An executive summary of three to four sentences\n\
         2. Three to five priority issues\n\
         3. An action plan with owners, priorities and dates\n\
         4. The expected effect on the reporting timeline\n\n\
         Data quality:\n{data}\n\n\
         Respond with a JSON object of the form:\n\
         {{\"executive_summary\": \"...\", \
         \"priority_issues\": [{{\"title\": \"...\", \"severity\": \"High\", \
         \"impact\": \"...\", \"resolution\": \"...\"}}], \
         \"action_items\": [{{\"title\": \"...\", \"owner\": \"...\", \"priority\": \"High\", \
         \"description\": \"...\", \"expected_outcome\": \"...\", \
         \"start_date\": \"YYYY-MM-DD\", \"due_date\": \"YYYY-MM-DD\"}}], \
         \"timeline_impact\": \"...\"}}"
    ))
}

/// Generate an action plan, falling back to [`QualityActionPlan::from_context`].
pub async fn plan_quality_actions(
    generator: &dyn TextGenerator,
    context: &QualityContext,
) -> Narrative<QualityActionPlan> {
    generate_or_fallback(generator, &quality_prompt(context), || {
        QualityActionPlan::from_context(context)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::DisabledGenerator;

    fn report() -> QualityReport {
        QualityReport {
            overall_score: 92.0,
            previous_score: 87.0,
            completeness: 95.0,
            accuracy: 90.0,
            consistency: 89.0,
            timeliness: 94.0,
            critical_issues: 2,
            data_sources: vec!["ERP".to_string(), "Planning".to_string()],
            anomalies: vec![
                Anomaly {
                    entity: "Cost of Sales".to_string(),
                    field: "Category".to_string(),
                    value: "Missing".to_string(),
                    expected: "COGS".to_string(),
                    severity: Severity::Medium,
                    description: "Category missing for some entries".to_string(),
                },
                Anomaly {
                    entity: "Revenue".to_string(),
                    field: "Amount".to_string(),
                    value: "1,000".to_string(),
                    expected: "1,000,000".to_string(),
                    severity: Severity::High,
                    description: "Order of magnitude error".to_string(),
                },
            ],
            validation_results: vec![
                ValidationResult {
                    check: "Cost Allocation".to_string(),
                    status: CheckStatus::Warning,
                    description: "Entries without department".to_string(),
                },
                ValidationResult {
                    check: "Reconciliation".to_string(),
                    status: CheckStatus::Passed,
                    description: String::new(),
                },
                ValidationResult {
                    check: "Eliminations".to_string(),
                    status: CheckStatus::Failed,
                    description: "Intercompany not eliminated".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_context_orders_issues() {
        let context = QualityContext::from_report(&report());
        assert_eq!(context.anomalies_count, 2);
        assert_eq!(context.metrics.overall_score_change, 5.0);
        assert_eq!(context.anomalies[0].entity, "Revenue");
        assert_eq!(context.open_checks.len(), 2);
        assert_eq!(context.open_checks[0].check, "Eliminations");
    }

    #[test]
    fn test_fallback_plan_follows_report() {
        let plan = QualityActionPlan::from_context(&QualityContext::from_report(&report()));

        assert!(plan.executive_summary.starts_with("Overall data quality scores 92 (+5 points"));
        assert_eq!(plan.priority_issues.len(), 2);
        assert_eq!(plan.priority_issues[0].title, "Revenue Amount");
        assert_eq!(
            plan.priority_issues[0].resolution,
            "Correct 1,000 to the expected 1,000,000 at source"
        );

        let titles: Vec<_> = plan.action_items.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Resolve Eliminations", "Resolve Cost Allocation"]);
        assert_eq!(plan.high_priority_actions().len(), 1);
        assert!(plan.timeline_impact.contains("2 critical issue(s)"));
    }

    #[test]
    fn test_clean_report_has_empty_plan() {
        let plan = QualityActionPlan::from_context(&QualityContext::from_report(
            &QualityReport::default(),
        ));
        assert!(plan.priority_issues.is_empty());
        assert!(plan.action_items.is_empty());
        assert!(plan.timeline_impact.starts_with("No critical issues"));
    }

    #[test]
    fn test_generated_plan_parses_dates() {
        let json = r#"{
            "executive_summary": "Accuracy is the weak point.",
            "action_items": [{
                "title": "Validation rules", "owner": "Finance Systems", "priority": "High",
                "description": "Flag order-of-magnitude errors",
                "start_date": "2023-07-01", "due_date": "2023-07-15"
            }]
        }"#;
        let plan: QualityActionPlan = serde_json::from_str(json).unwrap();
        let item = &plan.action_items[0];
        assert_eq!(item.start_date, NaiveDate::from_ymd_opt(2023, 7, 1));
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2023, 7, 15));
        assert!(plan.priority_issues.is_empty());
    }

    #[test]
    fn test_prompt_embeds_open_checks() {
        let request = quality_prompt(&QualityContext::from_report(&report()));
        assert!(request.json_output);
        assert!(request.prompt.contains("\"Eliminations\""));
        assert!(request.prompt.contains("\"anomalies_count\": 2"));
    }

    #[tokio::test]
    async fn test_plan_with_disabled_generator() {
        let context = QualityContext::from_report(&report());
        let narrative = plan_quality_actions(&DisabledGenerator, &context).await;
        assert!(narrative.is_fallback());
        assert_eq!(narrative.payload, QualityActionPlan::from_context(&context));
    }
}
