//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{discovery, llm, network, output, resolution};
use crate::types::{Result, UnifyError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Document discovery settings
    pub discovery: DiscoveryConfig,

    /// Model endpoint settings
    pub llm: LlmConfig,

    /// Output document settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            discovery: DiscoveryConfig::default(),
            llm: LlmConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `UnifyError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(UnifyError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(UnifyError::config(
                "LLM timeout_secs must be greater than 0",
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(UnifyError::config("LLM max_tokens must be greater than 0"));
        }

        if self.discovery.pattern.trim().is_empty() {
            return Err(UnifyError::config("Discovery pattern must not be empty"));
        }

        glob::Pattern::new(&self.discovery.pattern).map_err(|e| {
            UnifyError::Config(format!(
                "Invalid discovery pattern '{}': {}",
                self.discovery.pattern, e
            ))
        })?;

        Ok(())
    }
}

// =============================================================================
// Discovery Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File name glob, matched case-insensitively
    pub pattern: String,

    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,

    /// Follow symlinked directories (duplicates are not collapsed)
    pub follow_links: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            pattern: discovery::DEFAULT_PATTERN.to_string(),
            exclude_dirs: discovery::VCS_DIRS.iter().map(|d| d.to_string()).collect(),
            follow_links: false,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// How the output schema is communicated to the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CallingConvention {
    /// Ask for a JSON object in the message content
    #[default]
    Json,
    /// Declare the schema as a function and force the call
    Function,
}

impl std::fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallingConvention::Json => write!(f, "json"),
            CallingConvention::Function => write!(f, "function"),
        }
    }
}

impl std::str::FromStr for CallingConvention {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(CallingConvention::Json),
            "function" => Ok(CallingConvention::Function),
            _ => Err(format!(
                "Unknown calling convention: {}. Valid values: json, function",
                s
            )),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: azure, openai, ollama
    pub provider: String,

    /// Model name, or deployment name for Azure
    pub model: Option<String>,

    /// Endpoint base URL
    pub endpoint: Option<String>,

    /// Azure REST api-version
    pub api_version: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for generation (0.0 = deterministic)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Plain JSON response or function call
    pub calling_convention: CallingConvention,

    /// Credential; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
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

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "azure".to_string(),
            model: None,
            endpoint: None,
            api_version: llm::AZURE_API_VERSION.to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            max_tokens: llm::DEFAULT_MAX_TOKENS,
            calling_convention: CallingConvention::Json,
            api_key: None,
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the unified document is written
    pub path: PathBuf,

    /// Always use the deterministic renderer, ignoring the model's document
    pub force_render: bool,

    /// Model documents shorter than this are replaced by the renderer
    pub min_rendered_chars: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(output::DEFAULT_OUTPUT_PATH),
            force_render: false,
            min_rendered_chars: resolution::MIN_RENDERED_CHARS,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
