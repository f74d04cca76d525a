//! Azure OpenAI Provider
//!
//! Chat Completions against an Azure OpenAI deployment. Authentication uses
//! the `api-key` header; the deployment name stands in for the model.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Instant;
use tracing::info;

use super::openai::{ChatCompletionRequest, http_client, send_chat};
use super::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, config_or_env,
    validate_endpoint,
};
use crate::ai::prompt::ModelRequest;
use crate::config::CallingConvention;
use crate::constants::llm::{AZURE_API_VERSION, AZURE_DEFAULT_DEPLOYMENT};
use crate::types::{Result, UnifyError};

pub struct AzureOpenAiProvider {
    api_key: SecretString,
    endpoint: url::Url,
    deployment: String,
    api_version: String,
    temperature: f32,
    max_tokens: usize,
    convention: CallingConvention,
    client: reqwest::Client,
}

impl std::fmt::Debug for AzureOpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint.as_str())
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("convention", &self.convention)
            .finish()
    }
}

impl AzureOpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config_or_env(config.api_key, "AZURE_API_KEY").ok_or_else(|| {
            UnifyError::config(
                "Azure API key not found. Set AZURE_API_KEY env var or llm.api_key in config",
            )
        })?;

        let endpoint = config_or_env(config.endpoint, "AZURE_ENDPOINT").ok_or_else(|| {
            UnifyError::config(
                "Azure endpoint not found. Set AZURE_ENDPOINT env var or llm.endpoint in config",
            )
        })?;
        let endpoint = validate_endpoint(&endpoint, "Azure")?;

        let deployment = config_or_env(config.model, "AZURE_DEPLOYMENT")
            .unwrap_or_else(|| AZURE_DEFAULT_DEPLOYMENT.to_string());

        let api_version = if config.api_version.trim().is_empty() {
            AZURE_API_VERSION.to_string()
        } else {
            config.api_version
        };

        Ok(Self {
            api_key: SecretString::from(api_key),
            endpoint,
            deployment,
            api_version,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            convention: config.calling_convention,
            client: http_client(config.timeout_secs)?,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.as_str().trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

#[async_trait]
impl LlmProvider for AzureOpenAiProvider {
    async fn invoke(&self, request: &ModelRequest) -> Result<LlmResponse> {
        info!(
            "Invoking Azure OpenAI (deployment: {}, convention: {})",
            self.deployment, self.convention
        );

        let start_time = Instant::now();
        // Deployment is part of the URL, so the body carries no model
        let body = ChatCompletionRequest::new(
            request,
            None,
            self.temperature,
            self.max_tokens,
            self.convention,
        );

        let builder = self
            .client
            .post(self.completions_url())
            .header("api-key", self.api_key.expose_secret())
            .json(&body);

        let response = send_chat(builder, self.name()).await?;

        Ok(LlmResponse {
            usage: response.token_usage(),
            reply: response.into_reply(),
            timing: ResponseTiming::from_duration(start_time.elapsed()),
            metadata: ResponseMetadata {
                model: self.deployment.clone(),
                provider: "azure".to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        "azure"
    }

    fn model(&self) -> &str {
        &self.deployment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            provider: "azure".to_string(),
            model: Some("my-deployment".to_string()),
            endpoint: Some("https://example.openai.azure.com/".to_string()),
            api_key: Some("k".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_completions_url() {
        let provider = AzureOpenAiProvider::new(config()).unwrap();
        assert_eq!(
            provider.completions_url(),
            format!(
                "https://example.openai.azure.com/openai/deployments/my-deployment/chat/completions?api-version={}",
                AZURE_API_VERSION
            )
        );
        assert_eq!(provider.model(), "my-deployment");
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let mut config = config();
        config.endpoint = Some("not a url".to_string());
        let err = AzureOpenAiProvider::new(config).unwrap_err();
        assert!(matches!(err, UnifyError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let mut config = config();
        config.api_key = Some("super-secret".to_string());
        let provider = AzureOpenAiProvider::new(config).unwrap();
        assert!(!format!("{:?}", provider).contains("super-secret"));
    }
}
