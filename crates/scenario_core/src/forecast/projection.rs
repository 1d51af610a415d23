//! Quarterly revenue, EBITDA and net income projection.
//!
//! An annual growth rate is turned into one rate per projected quarter:
//! the first quarter of each projected year is dampened, the fourth is
//! boosted and optional Gaussian noise is added. Revenue then compounds at a
//! quarter of that rate. The confidence band widens linearly with distance.
//!
//! Noise is drawn from a seeded [`StdRng`], so a given seed always yields the
//! same projection. Without a seed the projection is noise-free.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::horizon::ForecastHorizon;
use crate::types::{FiscalQuarter, ForecastError};

/// Growth offset in percentage points for the first quarter of a projected year.
pub const FIRST_QUARTER_OFFSET_PP: f64 = -1.0;
/// Growth offset in percentage points for the fourth quarter of a projected year.
pub const FOURTH_QUARTER_OFFSET_PP: f64 = 1.5;
/// Noise standard deviation on the first and fourth quarters.
pub const SEASONAL_NOISE_SIGMA: f64 = 0.5;
/// Noise standard deviation on the second and third quarters.
pub const MID_YEAR_NOISE_SIGMA: f64 = 0.7;
/// Confidence band half-width added per projected quarter.
pub const BAND_WIDENING_PER_QUARTER: f64 = 0.05;
/// EBITDA margin improvement per projected quarter when no override is given.
pub const MARGIN_DRIFT_PER_QUARTER: f64 = 0.002;
/// Net income margin as a share of EBITDA margin.
pub const NET_INCOME_TO_EBITDA_RATIO: f64 = 0.65;

/// Last actual period the projection starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeed {
    /// Last actual period; projection starts with the following quarter
    pub period: FiscalQuarter,
    /// Revenue of that period
    pub revenue: f64,
    /// EBITDA margin of that period as a fraction (0.17 = 17%)
    pub ebitda_margin: f64,
}

impl ForecastSeed {
    /// Create a seed.
    pub fn new(period: FiscalQuarter, revenue: f64, ebitda_margin: f64) -> Self {
        Self {
            period,
            revenue,
            ebitda_margin,
        }
    }
}

/// Projection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastOptions {
    /// Number of quarters to project
    #[serde(default)]
    pub horizon: ForecastHorizon,
    /// Annual revenue growth in percent
    pub annual_growth_pct: f64,
    /// Fixed EBITDA margin as a fraction; disables the margin drift
    #[serde(default)]
    pub margin_override: Option<f64>,
    /// RNG seed for growth noise; `None` projects without noise
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ForecastOptions {
    /// Noise-free options.
    pub fn new(horizon: ForecastHorizon, annual_growth_pct: f64) -> Self {
        Self {
            horizon,
            annual_growth_pct,
            margin_override: None,
            seed: None,
        }
    }

    /// Fix the EBITDA margin.
    pub fn with_margin_override(mut self, margin: f64) -> Self {
        self.margin_override = Some(margin);
        self
    }

    /// Enable seeded growth noise.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One projected quarter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Projected period
    pub period: FiscalQuarter,
    /// Annualised growth rate applied this quarter, in percent
    pub growth_rate_pct: f64,
    /// Projected revenue
    pub revenue: f64,
    /// Lower confidence bound
    pub revenue_lower: f64,
    /// Upper confidence bound
    pub revenue_upper: f64,
    /// EBITDA margin as a fraction
    pub ebitda_margin: f64,
    /// Projected EBITDA
    pub ebitda: f64,
    /// Net income margin as a fraction
    pub net_income_margin: f64,
    /// Projected net income
    pub net_income: f64,
    /// Net income in percent of revenue
    pub roi_pct: f64,
}

/// A complete projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Starting point
    pub seed: ForecastSeed,
    /// Settings used
    pub options: ForecastOptions,
    /// Projected quarters in order
    pub points: Vec<ForecastPoint>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

impl Forecast {
    /// Mean projected revenue.
    pub fn average_revenue(&self) -> f64 {
        mean(self.points.iter().map(|p| p.revenue))
    }

    /// Mean projected EBITDA.
    pub fn average_ebitda(&self) -> f64 {
        mean(self.points.iter().map(|p| p.ebitda))
    }

    /// Mean EBITDA over mean revenue, in percent; zero for non-positive revenue.
    pub fn average_margin_pct(&self) -> f64 {
        let revenue = self.average_revenue();
        if revenue > 0.0 {
            self.average_ebitda() / revenue * 100.0
        } else {
            0.0
        }
    }

    /// Mean applied growth rate.
    pub fn average_growth_pct(&self) -> f64 {
        mean(self.points.iter().map(|p| p.growth_rate_pct))
    }

    /// Mean ROI.
    pub fn average_roi_pct(&self) -> f64 {
        mean(self.points.iter().map(|p| p.roi_pct))
    }

    /// Last projected point.
    pub fn last(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }
}

fn ensure_finite(name: &str, value: f64) -> Result<(), ForecastError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ForecastError::InvalidParameter(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Per-quarter growth rates for the horizon.
pub fn quarterly_growth_rates(options: &ForecastOptions) -> Result<Vec<f64>, ForecastError> {
    let g = options.annual_growth_pct;
    let n = options.horizon.quarters();

    let Some(seed) = options.seed else {
        return Ok((0..n)
            .map(|i| match i % 4 {
                0 => g + FIRST_QUARTER_OFFSET_PP,
                3 => g + FOURTH_QUARTER_OFFSET_PP,
                _ => g,
            })
            .collect());
    };

    let seasonal = Normal::new(0.0, SEASONAL_NOISE_SIGMA)
        .map_err(|e| ForecastError::Distribution(e.to_string()))?;
    let mid_year = Normal::new(0.0, MID_YEAR_NOISE_SIGMA)
        .map_err(|e| ForecastError::Distribution(e.to_string()))?;
    let mut rng = StdRng::seed_from_u64(seed);

    Ok((0..n)
        .map(|i| match i % 4 {
            0 => g + FIRST_QUARTER_OFFSET_PP + seasonal.sample(&mut rng),
            3 => g + FOURTH_QUARTER_OFFSET_PP + seasonal.sample(&mut rng),
            _ => g + mid_year.sample(&mut rng),
        })
        .collect())
}

/// Project revenue, EBITDA and net income from `seed`.
///
/// # Errors
///
/// [`ForecastError::InvalidParameter`] for a non-finite or negative seed
/// revenue, a non-finite growth rate or margin, or a horizon that runs past
/// [`FiscalQuarter::MAX_YEAR`].
pub fn project(seed: &ForecastSeed, options: &ForecastOptions) -> Result<Forecast, ForecastError> {
    ensure_finite("revenue", seed.revenue)?;
    ensure_finite("ebitda_margin", seed.ebitda_margin)?;
    ensure_finite("annual_growth_pct", options.annual_growth_pct)?;
    if let Some(margin) = options.margin_override {
        ensure_finite("margin_override", margin)?;
    }
    if seed.revenue < 0.0 {
        return Err(ForecastError::InvalidParameter(format!(
            "revenue must be non-negative, got {}",
            seed.revenue
        )));
    }

    let rates = quarterly_growth_rates(options)?;

    let mut period = seed.period;
    let mut revenue = seed.revenue;
    let mut points = Vec::with_capacity(rates.len());

    for (i, rate) in rates.into_iter().enumerate() {
        period = period.next().ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "projection from {} runs past year {}",
                seed.period,
                FiscalQuarter::MAX_YEAR
            ))
        })?;
        revenue *= 1.0 + rate / 4.0 / 100.0;

        let widening = BAND_WIDENING_PER_QUARTER * (i + 1) as f64;
        let ebitda_margin = options
            .margin_override
            .unwrap_or(seed.ebitda_margin + MARGIN_DRIFT_PER_QUARTER * i as f64);
        let net_income_margin = ebitda_margin * NET_INCOME_TO_EBITDA_RATIO;
        let net_income = revenue * net_income_margin;

        points.push(ForecastPoint {
            period,
            growth_rate_pct: rate,
            revenue,
            revenue_lower: revenue * (1.0 - widening),
            revenue_upper: revenue * (1.0 + widening),
            ebitda_margin,
            ebitda: revenue * ebitda_margin,
            net_income_margin,
            net_income,
            roi_pct: if revenue != 0.0 {
                net_income / revenue * 100.0
            } else {
                0.0
            },
        });
    }

    Ok(Forecast {
        seed: *seed,
        options: *options,
        points,
    })
}
