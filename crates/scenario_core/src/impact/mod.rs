//! Scenario impact calculation.
//!
//! This module provides:
//! - [`ImpactCalculator`] and [`compute_impact`]: baseline + parameters → impact
//! - [`RiskAssessment`]: five qualitative risk bands
//! - [`EbitdaBridge`] and [`ScenarioOutlook`]: derived presentation-free views
//! - [`SensitivityGrid`]: price × volume sweep evaluated with rayon

pub mod bridge;
pub mod calculator;
pub mod config;
pub mod grid;
pub mod outlook;
pub mod result;
pub mod risk;

pub use bridge::{BridgeStep, BridgeStepKind, EbitdaBridge};
pub use calculator::{compute_impact, ImpactCalculator};
pub use config::{BandThresholds, ImpactConfig, RiskThresholds, DEFAULT_INTERNATIONAL_EXPOSURE};
pub use grid::{GridAxes, SensitivityGrid};
pub use outlook::ScenarioOutlook;
pub use result::ScenarioImpact;
pub use risk::{RiskAssessment, RiskBand, RiskCategory};
