//! unireadme - Unified README Generator
//!
//! Collects the scattered README files of a multi-tool repository, asks a
//! language model for a structured analysis, and produces one unified
//! README from it.
//!
//! ## Pipeline
//!
//! - **Discovery**: README-style files found recursively, VCS metadata skipped
//! - **Request**: fixed instruction block plus every document in one request
//! - **Invocation**: exactly one call to Azure OpenAI, OpenAI or Ollama
//! - **Validation**: malformed or partial JSON recovered field by field
//! - **Rendering**: deterministic markdown when the model's text can't be used
//!
//! ## Quick Start
//!
//! ```ignore
//! use unireadme::{Config, UnifyPipeline, create_provider, ProviderConfig};
//!
//! let config = Config::default();
//! let provider = create_provider(&ProviderConfig::from(&config.llm))?;
//! let pipeline = UnifyPipeline::from_config(provider, &config);
//! if let Some(report) = pipeline.run(repo_path, &config.discovery).await? {
//!     std::fs::write(&config.output.path, &report.result.rendered_document)?;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`discovery`]: README location and owner labels
//! - [`ai`]: prompt construction, providers, response validation
//! - [`unify`]: resolution policy, renderer, pipeline
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod types;
pub mod unify;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{CallingConvention, Config, ConfigLoader};
pub use types::error::{ErrorCategory, FailureClass, LlmError, Result, UnifyError};
pub use types::{
    AnalysisReport, AnalysisRequest, AnalysisResult, Degradation, DocumentRecord, DocumentSource,
    ToolSummary,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use ai::{
    LlmProvider, LlmResponse, ModelReply, ParseOutcome, ProviderConfig, ResponseValidator,
    SharedProvider, create_provider, with_timeout,
};
pub use discovery::DocumentLocator;
pub use unify::{ReadmeRenderer, ResultResolver, UnifyPipeline};
