//! Error types for text generation.

use thiserror::Error;

/// Errors raised by a [`TextGenerator`](crate::TextGenerator).
///
/// None of these ever reach an API caller: [`generate_or_fallback`](crate::generate_or_fallback)
/// logs them and substitutes the fallback payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Generation is switched off in configuration
    #[error("Text generation is disabled")]
    Disabled,

    /// The API key environment variable is unset or empty
    #[error("Missing credentials: environment variable {env_var} is not set")]
    MissingCredentials {
        /// Variable that was consulted
        env_var: String,
    },

    /// Connection or protocol failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The request exceeded the configured timeout
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The response envelope could not be read
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The generated text did not match the expected payload
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl GenerationError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Map a reqwest error, distinguishing timeouts.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GenerationError::MissingCredentials {
            env_var: "OPENAI_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let err = GenerationError::Status {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "Service returned HTTP 503: overloaded");
    }

    #[test]
    fn test_helper_constructors() {
        assert_eq!(
            GenerationError::transport("refused"),
            GenerationError::Transport("refused".to_string())
        );
        assert!(GenerationError::malformed("no choices")
            .to_string()
            .contains("no choices"));
    }
}
