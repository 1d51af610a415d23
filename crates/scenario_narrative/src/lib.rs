//! # Scenario Narrative (L2: Text generation)
//!
//! Narrative text for scenario analytics, produced by an external text
//! generator when one is configured and by static fallbacks otherwise.
//!
//! This crate provides:
//! - The [`TextGenerator`] trait with OpenAI-compatible, Ollama and disabled backends
//! - [`generate_or_fallback`], which never surfaces a generation failure
//! - Performance summary, forecast recommendation, scenario commentary and
//!   data quality action plan kinds
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        scenario_narrative (L2)          │
//! ├─────────────────────────────────────────┤
//! │  generator  - Trait, request, provider │
//! │  client     - HTTP backends, config    │
//! │  narrative  - Generate-or-fallback     │
//! │  kinds/     - Payloads and prompts     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!              scenario_core (L1)
//! ```
//!
//! ## Example
//!
//! ```
//! use scenario_narrative::{comment_on_scenario, DisabledGenerator};
//! use scenario_core::{compute_impact, FinancialBaseline, ScenarioParameters};
//!
//! let baseline = FinancialBaseline::new(100_000_000.0, 17_000_000.0, 11_050_000.0, 25.0, 1.10);
//! let params = ScenarioParameters::neutral(&baseline).with_price_change(2.0);
//! let impact = compute_impact(&baseline, &params).unwrap();
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let narrative = runtime.block_on(comment_on_scenario(
//!     &DisabledGenerator,
//!     &baseline,
//!     &params,
//!     &impact,
//! ));
//! assert!(narrative.is_fallback());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod client;
pub mod error;
pub mod generator;
pub mod kinds;
pub mod narrative;

pub use client::{build_generator, GeneratorConfig, OllamaClient, OpenAiCompatibleClient};
pub use error::GenerationError;
pub use generator::{DisabledGenerator, GenerationRequest, Provider, TextGenerator};
pub use kinds::{
    comment_on_scenario, plan_quality_actions, recommend_for_forecast, summarise_performance,
    ForecastContext, ForecastRecommendations, PerformanceContext, PerformanceSummary,
    QualityActionPlan, QualityContext, ScenarioCommentary,
};
pub use narrative::{generate_or_fallback, Narrative, NarrativeSource};
