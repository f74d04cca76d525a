//! Ollama Local LLM Provider
//!
//! LLM provider for locally-running Ollama models via `/api/chat`.
//! No credential is needed; token counts come from the eval counters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::openai::http_client;
use super::{
    LlmProvider, LlmResponse, ModelReply, ProviderConfig, ResponseMetadata, ResponseTiming,
    TokenUsage, validate_endpoint,
};
use crate::ai::prompt::ModelRequest;
use crate::config::CallingConvention;
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";

/// Ollama Local LLM Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    convention: CallingConvention,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = config
            .endpoint
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let url = validate_endpoint(&api_base, "Ollama")?;

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_base: url.as_str().trim_end_matches('/').to_string(),
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            convention: config.calling_convention,
            client: http_client(config.timeout_secs)?,
        })
    }

    fn build_request(&self, request: &ModelRequest) -> OllamaRequest {
        // Ollama has no tool_choice; the function convention constrains
        // output with the schema itself
        let format = match self.convention {
            CallingConvention::Json => Value::String("json".to_string()),
            CallingConvention::Function => request.schema.clone(),
        };

        OllamaRequest {
            model: self.model.clone(),
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            stream: false,
            format,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn invoke(&self, request: &ModelRequest) -> Result<LlmResponse> {
        info!(
            "Invoking Ollama (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let start_time = Instant::now();
        let body = self.build_request(request);
        let url = format!("{}/api/chat", self.api_base);

        debug!("Sending request to Ollama API");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::with_provider(
                        ErrorCategory::Network,
                        format!(
                            "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                            self.api_base
                        ),
                        "ollama",
                    )
                } else {
                    ErrorClassifier::classify_transport(&e, "ollama")
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, body),
                "ollama",
            )
            .into());
        }

        let response_body: OllamaResponse = response.json().await.map_err(|e| {
            ErrorClassifier::classify(&format!("Undecodable Ollama response: {}", e), "ollama")
        })?;

        Ok(LlmResponse {
            usage: response_body.token_usage(),
            reply: response_body.into_reply(),
            timing: ResponseTiming::from_duration(start_time.elapsed()),
            metadata: ResponseMetadata {
                model: self.model.clone(),
                provider: "ollama".to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    format: Value,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    message: Option<OllamaReplyMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaResponse {
    fn token_usage(&self) -> TokenUsage {
        TokenUsage {
            input_tokens: self.prompt_eval_count.unwrap_or(0),
            output_tokens: self.eval_count.unwrap_or(0),
        }
    }

    fn into_reply(self) -> ModelReply {
        match self.message.and_then(|m| m.content) {
            Some(content) if !content.trim().is_empty() => ModelReply::Text(content),
            _ => ModelReply::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(convention: CallingConvention) -> OllamaProvider {
        OllamaProvider::new(ProviderConfig {
            provider: "ollama".to_string(),
            calling_convention: convention,
            ..Default::default()
        })
        .unwrap()
    }

    fn request() -> ModelRequest {
        ModelRequest {
            system: "sys".to_string(),
            user: "usr".to_string(),
            schema: json!({"type": "object"}),
        }
    }

    #[test]
    fn test_default_config() {
        let provider = provider(CallingConvention::Json);
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_json_format() {
        let body = provider(CallingConvention::Json).build_request(&request());
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][0]["role"], "system");
    }

    #[test]
    fn test_function_convention_sends_schema() {
        let body = provider(CallingConvention::Function).build_request(&request());
        assert_eq!(body.format, json!({"type": "object"}));
    }

    #[test]
    fn test_reply_and_usage() {
        let response: OllamaResponse = serde_json::from_value(json!({
            "message": {"role": "assistant", "content": "{}"},
            "prompt_eval_count": 100,
            "eval_count": 50
        }))
        .unwrap();
        assert_eq!(response.token_usage().total(), 150);
        assert_eq!(response.into_reply(), ModelReply::Text("{}".into()));

        let empty: OllamaResponse = serde_json::from_value(json!({"done": true})).unwrap();
        assert_eq!(empty.into_reply(), ModelReply::Empty);
    }

    #[test]
    fn test_message_without_content_is_empty() {
        for body in [
            json!({"message": {"role": "assistant"}}),
            json!({"message": {"role": "assistant", "content": null}}),
            json!({"message": null, "done": true}),
        ] {
            let response: OllamaResponse = serde_json::from_value(body).unwrap();
            assert_eq!(response.into_reply(), ModelReply::Empty);
        }
    }
}
