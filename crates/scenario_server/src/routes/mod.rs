//! REST API routes

pub mod error;
pub mod forecast;
pub mod forms;
pub mod health;
pub mod impact;
pub mod narrative;
pub mod quality;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use scenario_core::forecast::ForecastSeed;
use scenario_core::{
    BaselineSource, FinancialBaseline, ImpactCalculator, MetricsSnapshot, StaticBaselineSource,
};
use scenario_narrative::{build_generator, TextGenerator};

use crate::config::{ConfigError, ServerConfig};

pub use error::{ApiError, ApiJson, ErrorResponse};
pub use forms::FormStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime calculation
    pub start_time: Instant,
    /// Impact calculator built from the configured constants
    pub calculator: ImpactCalculator,
    /// Default baseline
    pub baseline_source: Arc<dyn BaselineSource>,
    /// Narrative backend
    pub generator: Arc<dyn TextGenerator>,
    /// Subscription and contact submissions
    pub forms: Arc<FormStore>,
}

impl AppState {
    /// Create application state from configuration
    pub fn new(config: Arc<ServerConfig>) -> Result<Self, ConfigError> {
        let generator = build_generator(&config.generator)
            .map_err(|e| ConfigError::InvalidGenerator(e.to_string()))?;
        Self::with_generator(config, generator)
    }

    /// Create application state with an explicit generator
    pub fn with_generator(
        config: Arc<ServerConfig>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, ConfigError> {
        let calculator = ImpactCalculator::new(config.impact)
            .map_err(|e| ConfigError::InvalidImpact(e.to_string()))?;
        let baseline_source = Arc::new(StaticBaselineSource::new(config.baseline.snapshot()));
        let forms = Arc::new(FormStore::new(config.forms));

        Ok(Self {
            config,
            start_time: Instant::now(),
            calculator,
            baseline_source,
            generator,
            forms,
        })
    }

    /// Latest metrics from the baseline source
    pub fn snapshot(&self) -> Result<MetricsSnapshot, ApiError> {
        Ok(self.baseline_source.snapshot()?)
    }

    /// Default baseline, or `requested` when the caller supplied one
    pub fn resolve_baseline(
        &self,
        requested: Option<FinancialBaseline>,
    ) -> Result<FinancialBaseline, ApiError> {
        match requested {
            Some(baseline) => Ok(baseline),
            None => Ok(self.snapshot()?.to_baseline()?),
        }
    }

    /// Forecast seed derived from the default baseline
    pub fn default_seed(&self) -> Result<ForecastSeed, ApiError> {
        let baseline = self.resolve_baseline(None)?;
        let margin = baseline.ebitda_margin_pct()? / 100.0;
        Ok(ForecastSeed::new(
            self.config.baseline.period,
            baseline.revenue,
            margin,
        ))
    }
}

/// Build the main router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::routes())
        .merge(impact::routes())
        .merge(forecast::routes())
        .merge(narrative::routes())
        .merge(quality::routes())
        .merge(forms::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, Response};
    use serde_json::Value;

    use scenario_narrative::{GenerationError, GenerationRequest, Provider, TextGenerator};

    use super::AppState;
    use crate::config::ServerConfig;

    /// Generator returning a fixed reply.
    pub struct CannedGenerator(pub String);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        fn provider(&self) -> Provider {
            Provider::Ollama
        }

        fn model(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            Ok(self.0.clone())
        }
    }

    pub fn test_state() -> AppState {
        AppState::new(Arc::new(ServerConfig::default())).unwrap()
    }

    pub fn canned_state(reply: &str) -> AppState {
        AppState::with_generator(
            Arc::new(ServerConfig::default()),
            Arc::new(CannedGenerator(reply.to_string())),
        )
        .unwrap()
    }

    pub fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_router_builds() {
        let router = build_router(test_state());
        let response = router.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let router = build_router(test_state());
        let response = router.oneshot(get("/api/v1/unknown")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let router = build_router(test_state());
        let request = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/impact")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[test]
    fn test_default_seed_uses_configured_period() {
        let state = test_state();
        let seed = state.default_seed().unwrap();
        assert_eq!(seed.period.to_string(), "2023-Q2");
        assert_eq!(seed.revenue, 100_000_000.0);
        assert!((seed.ebitda_margin - 0.17).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_baseline_prefers_request() {
        let state = test_state();
        let custom = FinancialBaseline::new(10.0, 2.0, 1.0, 20.0, 1.0);
        assert_eq!(state.resolve_baseline(Some(custom)).unwrap(), custom);
        assert_eq!(
            state.resolve_baseline(None).unwrap().revenue,
            100_000_000.0
        );
    }
}
