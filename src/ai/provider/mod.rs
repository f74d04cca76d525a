//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait used to send the analysis request.
//! A run performs exactly one `invoke` call; there is no retry or fallback
//! chain at this layer.
//!
//! ## Failure contract
//!
//! - Transport failures and non-2xx statuses are returned as `UnifyError::Llm`
//!   with a classified [`ErrorCategory`].
//! - A reachable endpoint that answers without choices or content yields
//!   `ModelReply::Empty`, never an error.

mod azure;
mod ollama;
mod openai;

pub use azure::AzureOpenAiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ai::prompt::ModelRequest;
use crate::config::{CallingConvention, LlmConfig};
use crate::types::{Result, UnifyError};

// =============================================================================
// Model Reply
// =============================================================================

/// What the endpoint sent back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// Plain message content
    Text(String),
    /// Function-call style payload; `arguments` holds the JSON text
    FunctionCall { name: String, arguments: String },
    /// No choices, or a choice with no content
    Empty,
}

impl ModelReply {
    /// Text to hand to the validator, if any
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::FunctionCall { arguments, .. } => Some(arguments),
            Self::Empty => None,
        }
    }
}

/// Complete invocation result including usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub reply: ModelReply,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with reply only (usage unknown)
    pub fn reply_only(reply: ModelReply) -> Self {
        Self {
            reply,
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (response)
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    /// Model or deployment used
    pub model: String,
    /// Provider name
    pub provider: String,
}

/// Shared LLM provider type
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// API keys are never serialized and are redacted in debug output. Each
/// provider converts the key to `SecretString` internally.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "azure", "openai", "ollama"
    pub provider: String,
    /// Model name, or deployment name for Azure
    pub model: Option<String>,
    /// Endpoint base URL
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Azure REST api-version
    pub api_version: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// JSON content or function call
    pub calling_convention: CallingConvention,
    /// API key
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("calling_convention", &self.calling_convention)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for ProviderConfig {
    fn from(llm: &LlmConfig) -> Self {
        Self {
            provider: llm.provider.clone(),
            model: llm.model.clone(),
            endpoint: llm.endpoint.clone(),
            api_version: llm.api_version.clone(),
            timeout_secs: llm.timeout_secs,
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            calling_convention: llm.calling_convention,
            api_key: llm.api_key.clone(),
        }
    }
}

/// Resolve a value from config, then from an environment variable.
/// Blank values count as missing.
pub(crate) fn config_or_env(value: Option<String>, var: &str) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
}

/// Parse and check an endpoint URL
pub(crate) fn validate_endpoint(endpoint: &str, provider: &str) -> Result<url::Url> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        UnifyError::Config(format!(
            "Invalid {} endpoint URL '{}': {}",
            provider, endpoint, e
        ))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UnifyError::Config(format!(
            "{} endpoint must use http or https scheme, got: {}",
            provider,
            url.scheme()
        )));
    }

    Ok(url)
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Generative-model endpoint
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the request and return the raw reply
    async fn invoke(&self, request: &ModelRequest) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model or deployment currently in use
    fn model(&self) -> &str;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "azure" => Ok(Arc::new(AzureOpenAiProvider::new(config.clone())?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(UnifyError::Config(format!(
            "Unknown provider: {}. Supported: azure, openai, ollama",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text() {
        assert_eq!(ModelReply::Text("hi".into()).raw_text(), Some("hi"));
        let call = ModelReply::FunctionCall {
            name: "f".into(),
            arguments: "{}".into(),
        };
        assert_eq!(call.raw_text(), Some("{}"));
        assert_eq!(ModelReply::Empty.raw_text(), None);
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let config = ProviderConfig {
            provider: "bard".to_string(),
            ..Default::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, UnifyError::Config(_)));
    }

    #[test]
    fn test_config_or_env_blank_is_missing() {
        assert_eq!(
            config_or_env(Some("  ".into()), "UNIREADME_TEST_UNSET_VAR"),
            None
        );
        assert_eq!(
            config_or_env(Some("x".into()), "UNIREADME_TEST_UNSET_VAR"),
            Some("x".into())
        );
    }

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("https://example.openai.azure.com/", "azure").is_ok());
        assert!(validate_endpoint("ftp://example.com", "azure").is_err());
        assert!(validate_endpoint("not a url", "azure").is_err());
    }

    #[test]
    fn test_provider_config_redacts_key() {
        let config = ProviderConfig {
            api_key: Some("secret-value".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-value"));
    }
}
