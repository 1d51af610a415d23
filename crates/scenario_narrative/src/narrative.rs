//! Generate-or-fallback narratives.
//!
//! Every narrative has a static fallback. A generation failure of any kind is
//! logged and replaced by that fallback, so callers always receive a payload
//! together with a record of where it came from.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::generator::{GenerationRequest, Provider, TextGenerator};

/// Origin of a narrative payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrativeSource {
    /// Produced by a text generator
    Generated {
        /// Backend used
        provider: Provider,
        /// Model used
        model: String,
    },
    /// Static fallback
    Fallback {
        /// Why generation was not used
        reason: String,
    },
}

/// A narrative payload with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative<T> {
    /// Structured narrative
    pub payload: T,
    /// Where the payload came from
    pub source: NarrativeSource,
    /// Creation time
    pub generated_at: DateTime<Utc>,
}

impl<T> Narrative<T> {
    /// Wrap a fallback payload.
    pub fn fallback(payload: T, reason: impl Into<String>) -> Self {
        Self {
            payload,
            source: NarrativeSource::Fallback {
                reason: reason.into(),
            },
            generated_at: Utc::now(),
        }
    }

    /// Whether the payload is the static fallback.
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, NarrativeSource::Fallback { .. })
    }
}

/// Strip a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse generated text into `T`.
pub fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T, GenerationError> {
    serde_json::from_str(strip_code_fences(text))
        .map_err(|e| GenerationError::InvalidPayload(e.to_string()))
}

/// Ask `generator` for a `T`, substituting `fallback()` on any failure.
///
/// Failures are logged at `warn` and never returned.
pub async fn generate_or_fallback<T, F>(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    fallback: F,
) -> Narrative<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let result = match generator.generate(request).await {
        Ok(text) => parse_payload::<T>(&text),
        Err(e) => Err(e),
    };

    match result {
        Ok(payload) => {
            tracing::debug!(
                provider = %generator.provider(),
                model = generator.model(),
                "Narrative generated"
            );
            Narrative {
                payload,
                source: NarrativeSource::Generated {
                    provider: generator.provider(),
                    model: generator.model().to_string(),
                },
                generated_at: Utc::now(),
            }
        }
        Err(e) => {
            if e == GenerationError::Disabled {
                tracing::debug!("Text generation disabled, using fallback narrative");
            } else {
                tracing::warn!(
                    provider = %generator.provider(),
                    error = %e,
                    "Narrative generation failed, using fallback"
                );
            }
            Narrative::fallback(fallback(), e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::DisabledGenerator;
    use async_trait::async_trait;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Note {
        text: String,
    }

    struct Canned(Result<String, GenerationError>);

    #[async_trait]
    impl TextGenerator for Canned {
        fn provider(&self) -> Provider {
            Provider::Ollama
        }

        fn model(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            self.0.clone()
        }
    }

    fn fallback_note() -> Note {
        Note {
            text: "fallback".to_string(),
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```\n{\"a\":1}```  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_payload_rejects_wrong_shape() {
        let err = parse_payload::<Note>("{\"other\": 1}").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_generated_payload() {
        let generator = Canned(Ok("```json\n{\"text\": \"hello\"}\n```".to_string()));
        let narrative =
            generate_or_fallback(&generator, &GenerationRequest::json("p"), fallback_note).await;
        assert_eq!(narrative.payload.text, "hello");
        assert_eq!(
            narrative.source,
            NarrativeSource::Generated {
                provider: Provider::Ollama,
                model: "canned".to_string()
            }
        );
        assert!(!narrative.is_fallback());
    }

    #[tokio::test]
    async fn test_invalid_json_falls_back() {
        let generator = Canned(Ok("not json at all".to_string()));
        let narrative =
            generate_or_fallback(&generator, &GenerationRequest::json("p"), fallback_note).await;
        assert_eq!(narrative.payload, fallback_note());
        assert!(narrative.is_fallback());
    }

    #[tokio::test]
    async fn test_transport_error_falls_back_with_reason() {
        let generator = Canned(Err(GenerationError::transport("connection refused")));
        let narrative =
            generate_or_fallback(&generator, &GenerationRequest::json("p"), fallback_note).await;
        match narrative.source {
            NarrativeSource::Fallback { reason } => assert!(reason.contains("connection refused")),
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disabled_generator_falls_back() {
        let narrative =
            generate_or_fallback(&DisabledGenerator, &GenerationRequest::json("p"), fallback_note)
                .await;
        assert!(narrative.is_fallback());
    }

    #[test]
    fn test_source_serialisation() {
        let source = NarrativeSource::Fallback {
            reason: "off".to_string(),
        };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["kind"], "fallback");
        assert_eq!(json["reason"], "off");
    }
}
