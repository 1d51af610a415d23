//! Price × volume sensitivity grid.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::calculator::ImpactCalculator;
use crate::types::{FinancialBaseline, ImpactError, ScenarioParameters};

/// Axis values for a sensitivity grid, in percentage points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    /// Price change values (rows)
    pub price_steps: Vec<f64>,
    /// Volume change values (columns)
    pub volume_steps: Vec<f64>,
}

impl GridAxes {
    /// Evenly spaced axes `-span..=span` with `steps` points each.
    ///
    /// Returns `None` for fewer than two steps or a non-positive span.
    pub fn symmetric(span: f64, steps: usize) -> Option<Self> {
        if steps < 2 || span <= 0.0 || !span.is_finite() {
            return None;
        }
        let delta = 2.0 * span / (steps - 1) as f64;
        let axis: Vec<f64> = (0..steps).map(|i| -span + delta * i as f64).collect();
        Some(Self {
            price_steps: axis.clone(),
            volume_steps: axis,
        })
    }
}

/// EBITDA impact percentage for every combination of price and volume change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// Price change values (rows)
    pub price_steps: Vec<f64>,
    /// Volume change values (columns)
    pub volume_steps: Vec<f64>,
    /// `ebitda_impact_pct[row][col]`
    pub ebitda_impact_pct: Vec<Vec<f64>>,
}

impl SensitivityGrid {
    /// Evaluate the grid around `base`, replacing its price and volume changes.
    ///
    /// Rows are evaluated in parallel. Any failing cell fails the grid.
    pub fn compute(
        calculator: &ImpactCalculator,
        baseline: &FinancialBaseline,
        base: &ScenarioParameters,
        axes: &GridAxes,
    ) -> Result<Self, ImpactError> {
        let rows: Result<Vec<Vec<f64>>, ImpactError> = axes
            .price_steps
            .par_iter()
            .map(|&price| {
                axes.volume_steps
                    .iter()
                    .map(|&volume| {
                        let params = base.with_price_change(price).with_volume_change(volume);
                        calculator
                            .compute(baseline, &params)
                            .map(|impact| impact.ebitda_impact_pct)
                    })
                    .collect::<Result<Vec<f64>, ImpactError>>()
            })
            .collect();

        Ok(Self {
            price_steps: axes.price_steps.clone(),
            volume_steps: axes.volume_steps.clone(),
            ebitda_impact_pct: rows?,
        })
    }

    /// Value at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.ebitda_impact_pct.get(row)?.get(col).copied()
    }

    /// `(price, volume, ebitda_impact_pct)` of the best cell.
    pub fn best(&self) -> Option<(f64, f64, f64)> {
        self.cells()
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// `(price, volume, ebitda_impact_pct)` of the worst cell.
    pub fn worst(&self) -> Option<(f64, f64, f64)> {
        self.cells()
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
    }

    fn cells(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.price_steps
            .iter()
            .zip(&self.ebitda_impact_pct)
            .flat_map(move |(&price, row)| {
                self.volume_steps
                    .iter()
                    .zip(row)
                    .map(move |(&volume, &pct)| (price, volume, pct))
            })
    }
}
