//! Text generator trait and request type.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible `/chat/completions`
    OpenAi,
    /// Ollama `/api/generate`
    Ollama,
    /// Always fall back
    #[default]
    Disabled,
}

impl Provider {
    /// Get the provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "open_ai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            _ => Err(format!("Invalid provider: {}", s)),
        }
    }
}

/// A single prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Full prompt text
    pub prompt: String,
    /// Ask the backend for a JSON object
    pub json_output: bool,
}

impl GenerationRequest {
    /// Request a JSON object answer.
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json_output: true,
        }
    }

    /// Request free text.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json_output: false,
        }
    }
}

/// External text-generation service.
///
/// Implementations are shared across request handlers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend kind
    fn provider(&self) -> Provider;

    /// Model identifier sent to the backend
    fn model(&self) -> &str;

    /// Generate text for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Generator used when generation is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn provider(&self) -> Provider {
        Provider::Disabled
    }

    fn model(&self) -> &str {
        "none"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Disabled)
    }
}
