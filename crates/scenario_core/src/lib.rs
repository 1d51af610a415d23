//! # Scenario Core (L1: Foundation)
//!
//! Pure financial scenario analytics: no I/O, no async.
//!
//! This crate provides:
//! - Baseline and scenario parameter types
//! - The scenario impact calculator with five-band risk assessment
//! - EBITDA bridge, outlook and a rayon-parallel sensitivity grid
//! - Period comparison, variance and profitability analytics
//! - Quarterly projection and named growth scenarios
//! - Data quality reports
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          scenario_core (L1)             │
//! ├─────────────────────────────────────────┤
//! │  types/     - Baseline, parameters,    │
//! │               quarters, errors          │
//! │  impact/    - Calculator, risk bands,  │
//! │               bridge, grid              │
//! │  analysis/  - YoY, variance, margins   │
//! │  baseline   - Metrics snapshots        │
//! │  forecast/  - Projection, presets      │
//! │  quality    - Scores, anomalies, checks│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use scenario_core::impact::{compute_impact, RiskBand};
//! use scenario_core::types::{FinancialBaseline, ScenarioParameters};
//!
//! let baseline = FinancialBaseline::new(100_000_000.0, 17_000_000.0, 11_050_000.0, 25.0, 1.10);
//! let params = ScenarioParameters::neutral(&baseline)
//!     .with_price_change(2.0)
//!     .with_cost_change(1.0);
//!
//! let impact = compute_impact(&baseline, &params).unwrap();
//! assert_eq!(impact.ebitda_impact, 1_000_000.0);
//! assert_eq!(impact.risk_assessment.overall, RiskBand::Low);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analysis;
pub mod baseline;
pub mod forecast;
pub mod impact;
pub mod quality;
pub mod types;

// Re-export commonly used types
pub use baseline::{BaselineSource, MetricsSnapshot, StaticBaselineSource};
pub use impact::{compute_impact, ImpactCalculator, ImpactConfig, RiskAssessment, ScenarioImpact};
pub use quality::QualityReport;
pub use types::{
    BaselineError, FinancialBaseline, FiscalQuarter, ForecastError, ImpactError, QualityError,
    ScenarioParameters,
};
