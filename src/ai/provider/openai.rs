//! OpenAI API Provider
//!
//! LLM provider using OpenAI's Chat Completions API. The request/response
//! wire types here are shared with the Azure OpenAI provider, which speaks
//! the same protocol on a different URL layout.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    LlmProvider, LlmResponse, ModelReply, ProviderConfig, ResponseMetadata, ResponseTiming,
    TokenUsage, config_or_env, validate_endpoint,
};
use crate::ai::prompt::ModelRequest;
use crate::config::CallingConvention;
use crate::constants::llm::ANALYSIS_FUNCTION_NAME;
use crate::constants::network::CONNECTION_TIMEOUT_SECS;
use crate::types::{ErrorClassifier, Result, UnifyError};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    convention: CallingConvention,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("convention", &self.convention)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config_or_env(config.api_key, "OPENAI_API_KEY").ok_or_else(|| {
            UnifyError::config(
                "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config",
            )
        })?;

        let api_base = config
            .endpoint
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        validate_endpoint(&api_base, "OpenAI")?;

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            convention: config.calling_convention,
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn invoke(&self, request: &ModelRequest) -> Result<LlmResponse> {
        info!(
            "Invoking OpenAI (model: {}, convention: {})",
            self.model, self.convention
        );

        let start_time = Instant::now();
        let body = ChatCompletionRequest::new(
            request,
            Some(self.model.clone()),
            self.temperature,
            self.max_tokens,
            self.convention,
        );
        let url = format!("{}/chat/completions", self.api_base);

        let builder = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body);

        let response = send_chat(builder, self.name()).await?;

        Ok(LlmResponse {
            usage: response.token_usage(),
            reply: response.into_reply(),
            timing: ResponseTiming::from_duration(start_time.elapsed()),
            metadata: ResponseMetadata {
                model: self.model.clone(),
                provider: "openai".to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// Shared Chat Completions plumbing
// =============================================================================

pub(super) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS.min(timeout_secs)))
        .build()
        .map_err(|e| UnifyError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Send a prepared chat request and decode the body.
///
/// Transport errors and non-success statuses become classified `LlmError`s.
pub(super) async fn send_chat(
    builder: reqwest::RequestBuilder,
    provider: &str,
) -> Result<ChatCompletionResponse> {
    debug!("Sending chat completion request ({})", provider);

    let response = builder
        .send()
        .await
        .map_err(|e| ErrorClassifier::classify_transport(&e, provider))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ErrorClassifier::classify_http_status(
            status.as_u16(),
            &format!("{} API error ({}): {}", provider, status, body),
            provider,
        )
        .into());
    }

    response.json::<ChatCompletionResponse>().await.map_err(|e| {
        UnifyError::from(ErrorClassifier::classify(
            &format!("Undecodable {} response: {}", provider, e),
            provider,
        ))
    })
}

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

impl ChatCompletionRequest {
    pub(super) fn new(
        request: &ModelRequest,
        model: Option<String>,
        temperature: f32,
        max_tokens: usize,
        convention: CallingConvention,
    ) -> Self {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: request.system.clone(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: request.user.clone(),
            },
        ];

        let (response_format, tools, tool_choice) = match convention {
            CallingConvention::Json => (
                Some(ResponseFormat {
                    format_type: "json_object".to_string(),
                }),
                None,
                None,
            ),
            CallingConvention::Function => (
                None,
                Some(vec![json!({
                    "type": "function",
                    "function": {
                        "name": ANALYSIS_FUNCTION_NAME,
                        "description": "Output schema for repository analysis that generates unified documentation.",
                        "parameters": request.schema,
                    }
                })]),
                Some(json!({
                    "type": "function",
                    "function": { "name": ANALYSIS_FUNCTION_NAME }
                })),
            ),
        };

        Self {
            model,
            messages,
            temperature,
            max_tokens,
            response_format,
            tools,
            tool_choice,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

impl ChatCompletionResponse {
    pub(super) fn token_usage(&self) -> TokenUsage {
        self.usage
            .as_ref()
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default()
    }

    /// First choice as a reply; tool calls win over content
    pub(super) fn into_reply(self) -> ModelReply {
        let Some(choice) = self.choices.into_iter().flatten().next() else {
            warn!("Endpoint returned no choices");
            return ModelReply::Empty;
        };
        let Some(message) = choice.message else {
            warn!("Endpoint returned a choice without a message");
            return ModelReply::Empty;
        };

        let call = message
            .tool_calls
            .into_iter()
            .flatten()
            .map(|c| c.function)
            .next()
            .or(message.function_call);

        if let Some(call) = call {
            return ModelReply::FunctionCall {
                name: call.name,
                arguments: call.arguments,
            };
        }

        match message.content {
            Some(content) if !content.trim().is_empty() => ModelReply::Text(content),
            _ => {
                warn!("Endpoint returned a choice without content");
                ModelReply::Empty
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ModelRequest {
        ModelRequest {
            system: "sys".to_string(),
            user: "usr".to_string(),
            schema: json!({"type": "object"}),
        }
    }

    fn parse(body: Value) -> ChatCompletionResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_json_convention_request() {
        let body = ChatCompletionRequest::new(
            &request(),
            Some("gpt-4o".into()),
            0.0,
            100,
            CallingConvention::Json,
        );
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert!(value.get("tools").is_none());
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "usr");
    }

    #[test]
    fn test_function_convention_request() {
        let body =
            ChatCompletionRequest::new(&request(), None, 0.0, 100, CallingConvention::Function);
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("model").is_none());
        assert!(value.get("response_format").is_none());
        assert_eq!(
            value["tools"][0]["function"]["name"],
            ANALYSIS_FUNCTION_NAME
        );
        assert_eq!(value["tools"][0]["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_reply_from_content() {
        let response = parse(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"a\":1}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }));
        assert_eq!(response.token_usage().total(), 15);
        assert_eq!(response.into_reply(), ModelReply::Text("{\"a\":1}".into()));
    }

    #[test]
    fn test_reply_from_tool_call() {
        let response = parse(json!({
            "choices": [{"message": {
                "content": null,
                "tool_calls": [{"id": "1", "type": "function",
                    "function": {"name": "RepositoryAnalysisOutput", "arguments": "{}"}}]
            }}]
        }));
        assert_eq!(
            response.into_reply(),
            ModelReply::FunctionCall {
                name: "RepositoryAnalysisOutput".into(),
                arguments: "{}".into()
            }
        );
    }

    #[test]
    fn test_reply_from_legacy_function_call() {
        let response = parse(json!({
            "choices": [{"message": {"function_call": {"name": "f", "arguments": "{\"x\":1}"}}}]
        }));
        assert!(matches!(response.into_reply(), ModelReply::FunctionCall { .. }));
    }

    #[test]
    fn test_no_choices_is_empty() {
        assert_eq!(parse(json!({"choices": []})).into_reply(), ModelReply::Empty);
        assert_eq!(parse(json!({})).into_reply(), ModelReply::Empty);
        assert_eq!(
            parse(json!({"choices": [{"message": {"content": "  "}}]})).into_reply(),
            ModelReply::Empty
        );
        assert_eq!(
            parse(json!({"id": "x", "choices": null})).into_reply(),
            ModelReply::Empty
        );
        assert_eq!(
            parse(json!({"choices": [{"index": 0, "finish_reason": "stop"}]})).into_reply(),
            ModelReply::Empty
        );
        assert_eq!(
            parse(json!({"choices": [{"message": null}]})).into_reply(),
            ModelReply::Empty
        );
    }

    #[test]
    fn test_partial_usage_is_counted() {
        let response = parse(json!({
            "choices": [{"message": {"content": "text"}}],
            "usage": {"prompt_tokens": 7}
        }));
        assert_eq!(response.token_usage().input_tokens, 7);
        assert_eq!(response.token_usage().output_tokens, 0);
        assert_eq!(response.into_reply(), ModelReply::Text("text".into()));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        // SAFETY: OPENAI_API_KEY is not read by any other test
        unsafe {
            std::env::remove_var("OPENAI_API_KEY");
        }
        let config = ProviderConfig {
            provider: "openai".to_string(),
            api_key: None,
            ..Default::default()
        };
        let err = OpenAiProvider::new(config).unwrap_err();
        assert!(matches!(err, UnifyError::Config(_)));
    }
}
