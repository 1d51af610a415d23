//! HTTP clients for text-generation backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::GenerationError;
use crate::generator::{DisabledGenerator, GenerationRequest, Provider, TextGenerator};

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
/// Default environment variable holding the API key.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const MAX_ERROR_BODY: usize = 512;

/// Generator configuration, usually the `[generator]` section of the server config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Backend kind
    pub provider: Provider,
    /// Endpoint root; provider default when absent
    pub base_url: Option<String>,
    /// Model; provider default when absent
    pub model: Option<String>,
    /// Environment variable holding the API key (OpenAI only)
    pub api_key_env: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Disabled,
            base_url: None,
            model: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl GeneratorConfig {
    /// Endpoint root after applying the provider default.
    pub fn effective_base_url(&self) -> String {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Provider::Ollama) => DEFAULT_OLLAMA_BASE_URL.to_string(),
            (None, _) => DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    /// Model after applying the provider default.
    pub fn effective_model(&self) -> String {
        match (&self.model, self.provider) {
            (Some(model), _) => model.clone(),
            (None, Provider::Ollama) => DEFAULT_OLLAMA_MODEL.to_string(),
            (None, _) => DEFAULT_OPENAI_MODEL.to_string(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("generator timeout_ms must be greater than 0".to_string());
        }
        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("generator base_url must be http(s): {}", url));
            }
        }
        if self.provider == Provider::OpenAi && self.api_key_env.trim().is_empty() {
            return Err("generator api_key_env cannot be empty".to_string());
        }
        Ok(())
    }
}

fn http_client(timeout_ms: u64) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| GenerationError::transport(e.to_string()))
}

async fn read_success(
    response: reqwest::Response,
    timeout_ms: u64,
) -> Result<reqwest::Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response
        .text()
        .await
        .map_err(|e| GenerationError::from_reqwest(e, timeout_ms))?;
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    Err(GenerationError::Status {
        status: status.as_u16(),
        body,
    })
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for OpenAI-compatible chat-completions APIs.
pub struct OpenAiCompatibleClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    /// Create a client with an explicit key.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout_ms: u64,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_ms,
            client: http_client(timeout_ms)?,
        })
    }

    /// Create a client, reading the key from the configured environment variable.
    ///
    /// A missing key is not an error here; every call then fails with
    /// [`GenerationError::MissingCredentials`].
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var(&config.api_key_env).ok();
        let mut client = Self::new(
            config.effective_base_url(),
            config.effective_model(),
            api_key,
            config.timeout_ms,
        )?;
        client.api_key_env = config.api_key_env.clone();
        Ok(client)
    }

    /// Whether a key is available.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::MissingCredentials {
                env_var: self.api_key_env.clone(),
            })?;

        let mut body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": request.prompt}],
        });
        if request.json_output {
            body["response_format"] = json!({"type": "json_object"});
        }

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(e, self.timeout_ms))?;

        let completion: ChatCompletion = read_success(response, self.timeout_ms)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::malformed(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::malformed("response has no message content"))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_ms,
            client: http_client(timeout_ms)?,
        })
    }

    /// Create a client from configuration.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        Self::new(
            config.effective_base_url(),
            config.effective_model(),
            config.timeout_ms,
        )
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    fn provider(&self) -> Provider {
        Provider::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let mut body = json!({
            "model": self.model,
            "prompt": request.prompt,
            "stream": false,
        });
        if request.json_output {
            body["format"] = json!("json");
        }

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(e, self.timeout_ms))?;

        let reply: OllamaResponse = read_success(response, self.timeout_ms)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::malformed(e.to_string()))?;

        Ok(reply.response)
    }
}

/// Build the generator selected by `config`.
pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    let generator: Arc<dyn TextGenerator> = match config.provider {
        Provider::OpenAi => Arc::new(OpenAiCompatibleClient::from_config(config)?),
        Provider::Ollama => Arc::new(OllamaClient::from_config(config)?),
        Provider::Disabled => Arc::new(DisabledGenerator),
    };
    tracing::debug!(
        provider = %generator.provider(),
        model = generator.model(),
        "Text generator configured"
    );
    Ok(generator)
}
