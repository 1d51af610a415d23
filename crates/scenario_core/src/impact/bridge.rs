//! EBITDA bridge (waterfall) from baseline to scenario.

use serde::{Deserialize, Serialize};

use super::result::ScenarioImpact;

/// How a bridge step is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeStepKind {
    /// A level; the running total restarts here
    Absolute,
    /// A delta added to the running total
    Relative,
}

/// One bar of the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeStep {
    /// Bar label
    pub label: String,
    /// Level or delta
    pub kind: BridgeStepKind,
    /// Amount in currency units
    pub value: f64,
}

impl BridgeStep {
    fn absolute(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            kind: BridgeStepKind::Absolute,
            value,
        }
    }

    fn relative(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            kind: BridgeStepKind::Relative,
            value,
        }
    }
}

/// Ordered bridge steps.
///
/// `Base EBITDA → Price → Volume → Cost → FX → Scenario EBITDA → Tax → Scenario Net Income Proxy`.
/// Relative steps between two absolute steps sum to their difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EbitdaBridge {
    /// Steps in drawing order
    pub steps: Vec<BridgeStep>,
}

impl EbitdaBridge {
    /// Build the bridge for a computed impact.
    pub fn from_impact(impact: &ScenarioImpact) -> Self {
        let steps = vec![
            BridgeStep::absolute("Base EBITDA", impact.base_ebitda),
            BridgeStep::relative("Price", impact.price_impact),
            BridgeStep::relative("Volume", impact.volume_impact),
            BridgeStep::relative("Cost", impact.cost_impact),
            BridgeStep::relative("FX", impact.fx_impact),
            BridgeStep::absolute("Scenario EBITDA", impact.new_ebitda),
            BridgeStep::relative("Tax", impact.tax_impact),
            BridgeStep::absolute("Scenario Net Income Proxy", impact.new_ebitda + impact.tax_impact),
        ];
        Self { steps }
    }

    /// Largest absolute drawdown among relative steps, if any is negative.
    pub fn largest_drag(&self) -> Option<&BridgeStep> {
        self.steps
            .iter()
            .filter(|s| s.kind == BridgeStepKind::Relative && s.value < 0.0)
            .min_by(|a, b| {
                a.value
                    .partial_cmp(&b.value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Check that each run of relative steps reconciles to the next level.
    pub fn reconciles(&self, tolerance: f64) -> bool {
        let mut running: Option<f64> = None;
        for step in &self.steps {
            match step.kind {
                BridgeStepKind::Absolute => {
                    if let Some(total) = running {
                        if (total - step.value).abs() > tolerance {
                            return false;
                        }
                    }
                    running = Some(step.value);
                }
                BridgeStepKind::Relative => {
                    running = running.map(|t| t + step.value);
                }
            }
        }
        true
    }
}
