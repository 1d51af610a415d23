//! API error responses
//!
//! Domain errors map to HTTP statuses here and nowhere else:
//! - undefined divisions, non-finite inputs and overflowing results: 422
//! - malformed bodies and out-of-range request values: 400
//! - missing baseline metrics: 422
//! - everything else: 500

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scenario_core::{BaselineError, ForecastError, ImpactError};

/// Error body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error type identifier (e.g. "ValidationError", "DivisionUndefined")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Offending field, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Impact(#[from] ImpactError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Baseline(#[from] BaselineError),

    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a validation error (HTTP 400)
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Impact(e) | ApiError::Baseline(BaselineError::Impact(e)) => match e {
                ImpactError::DivisionUndefined { .. }
                | ImpactError::NonFiniteInput { .. }
                | ImpactError::NonFiniteResult { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ImpactError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Baseline(BaselineError::MissingMetric { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Forecast(ForecastError::InvalidParameter(_)) => StatusCode::BAD_REQUEST,
            ApiError::Forecast(ForecastError::Distribution(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error body for this error
    pub fn to_response(&self) -> ErrorResponse {
        let (error, field) = match self {
            ApiError::Impact(e) | ApiError::Baseline(BaselineError::Impact(e)) => match e {
                ImpactError::DivisionUndefined { metric } => {
                    ("DivisionUndefined", Some(metric.to_string()))
                }
                ImpactError::NonFiniteInput { field } => {
                    ("NonFiniteInput", Some(field.to_string()))
                }
                ImpactError::NonFiniteResult { field } => {
                    ("NonFiniteResult", Some(field.to_string()))
                }
                ImpactError::InvalidConfig(_) => ("ConfigurationError", None),
            },
            ApiError::Baseline(BaselineError::MissingMetric { metric, .. }) => {
                ("MissingMetric", Some(metric.clone()))
            }
            ApiError::Forecast(ForecastError::InvalidParameter(_)) => ("ValidationError", None),
            ApiError::Forecast(ForecastError::Distribution(_)) => ("CalculationError", None),
            ApiError::Validation { field, .. } => ("ValidationError", field.clone()),
            ApiError::Internal(_) => ("InternalError", None),
        };
        ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
            field,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation {
            message: rejection.body_text(),
            field: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

/// JSON body extractor whose rejections use [`ErrorResponse`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
