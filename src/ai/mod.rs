//! AI Integration Layer
//!
//! Request construction, the single model invocation, and response validation.

pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use prompt::{ModelRequest, PromptBuilder, PromptSection, RequestBuilder};
pub use provider::{
    AzureOpenAiProvider, LlmProvider, LlmResponse, ModelReply, OllamaProvider, OpenAiProvider,
    ProviderConfig, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
pub use timeout::with_timeout;
pub use validation::{Extraction, JsonExtractor, ParseOutcome, ResponseValidator};
