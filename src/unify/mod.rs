//! Unification Pipeline
//!
//! Locator → Request Builder → Model Invoker → Validator → Resolver.
//!
//! Each stage consumes an immutable input and produces a new value; only
//! configuration and connectivity failures escape as errors. Everything
//! about the shape of the model's answer is recovered locally and reported
//! through [`AnalysisReport::degradations`].

pub mod renderer;
pub mod resolve;

pub use renderer::{ReadmeRenderer, heading_anchor, repo_slug};
pub use resolve::ResultResolver;

use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::ai::prompt::RequestBuilder;
use crate::ai::provider::{ModelReply, SharedProvider};
use crate::ai::timeout::with_timeout;
use crate::ai::validation::ResponseValidator;
use crate::config::{Config, DiscoveryConfig};
use crate::constants::network::DEFAULT_TIMEOUT_SECS;
use crate::discovery::DocumentLocator;
use crate::types::{AnalysisReport, AnalysisRequest, Result};

pub struct UnifyPipeline {
    provider: SharedProvider,
    timeout: Duration,
    resolver: ResultResolver,
}

impl UnifyPipeline {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            resolver: ResultResolver::default(),
        }
    }

    pub fn from_config(provider: SharedProvider, config: &Config) -> Self {
        Self::new(provider)
            .with_timeout(Duration::from_secs(config.llm.timeout_secs))
            .with_resolver(ResultResolver::from_config(&config.output))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_resolver(mut self, resolver: ResultResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Discover documents under `root` and wrap them in a request.
    ///
    /// The identifier is the canonical root path when it can be resolved.
    pub fn collect(root: &Path, discovery: &DiscoveryConfig) -> Result<AnalysisRequest> {
        let locator = DocumentLocator::from_config(root, discovery)?;
        let documents = locator.locate()?;

        let identifier = root
            .canonicalize()
            .unwrap_or_else(|_| root.to_path_buf())
            .to_string_lossy()
            .to_string();

        info!("Found {} README files in {}", documents.len(), identifier);
        Ok(AnalysisRequest::new(identifier, documents))
    }

    /// Send one request and resolve the reply into a report
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let model_request = RequestBuilder::build(request);
        debug!(
            "Prompt assembled: {} documents, {} bytes",
            request.documents.len(),
            model_request.len()
        );

        info!(
            "Analyzing '{}' with {} ({})",
            request.repository_name(),
            self.provider.name(),
            self.provider.model()
        );

        let response = with_timeout(
            self.timeout,
            self.provider.invoke(&model_request),
            "model invocation",
        )
        .await?;

        debug!(
            "Model replied in {}ms ({} tokens)",
            response.timing.total_ms,
            response.usage.total()
        );

        let validator = ResponseValidator::new(&request.repository_identifier);
        let report = match response.reply.raw_text() {
            Some(raw) => {
                let outcome = validator.validate(raw);
                if !outcome.is_parsed() {
                    debug!("Response did not decode cleanly, degrading");
                }
                self.resolver.resolve(outcome, &validator)
            }
            None => self.resolver.resolve_empty(&validator),
        };

        if let ModelReply::FunctionCall { name, .. } = &response.reply {
            debug!("Reply arrived as function call '{}'", name);
        }

        info!(
            "Resolved '{}' with {} tools (source: {:?})",
            report.result.repo_name,
            report.result.tools.len(),
            report.source
        );
        Ok(report)
    }

    /// Collect then analyze. `None` when no documents were found; the
    /// model is not called in that case.
    pub async fn run(
        &self,
        root: &Path,
        discovery: &DiscoveryConfig,
    ) -> Result<Option<AnalysisReport>> {
        let request = Self::collect(root, discovery)?;
        if request.documents.is_empty() {
            return Ok(None);
        }
        self.analyze(&request).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::prompt::ModelRequest;
    use crate::ai::provider::{LlmProvider, LlmResponse};
    use crate::types::{
        Degradation, DocumentSource, ErrorCategory, FailureClass, LlmError, UnifyError,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Returns a fixed reply and records what it was sent
    struct CannedProvider {
        reply: ModelReply,
        calls: AtomicUsize,
        last_user: Mutex<String>,
    }

    impl CannedProvider {
        fn new(reply: ModelReply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                last_user: Mutex::new(String::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn invoke(&self, request: &ModelRequest) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_user.lock().unwrap() = request.user.clone();
            Ok(LlmResponse::reply_only(self.reply.clone()))
        }

        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-model"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        async fn invoke(&self, _request: &ModelRequest) -> Result<LlmResponse> {
            Err(LlmError::with_provider(ErrorCategory::Auth, "401 Unauthorized", "canned").into())
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn model(&self) -> &str {
            "none"
        }
    }

    struct StalledProvider;

    #[async_trait]
    impl LlmProvider for StalledProvider {
        async fn invoke(&self, _request: &ModelRequest) -> Result<LlmResponse> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(LlmResponse::reply_only(ModelReply::Empty))
        }

        fn name(&self) -> &str {
            "stalled"
        }

        fn model(&self) -> &str {
            "none"
        }
    }

    fn two_tool_repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        for (dir, text) in [("tool-a", "Tool A does X"), ("tool-b", "Tool B does Y")] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
            fs::write(temp.path().join(dir).join("README.md"), text).unwrap();
        }
        temp
    }

    fn model_answer(readme: &str) -> String {
        json!({
            "repo_name": "tools",
            "repo_description": "Two small tools",
            "tools": [
                {"name": "tool-a", "description": "Does X", "key_features": ["X"]},
                {"name": "tool-b", "description": "Does Y", "key_features": ["Y"]}
            ],
            "unified_readme": readme
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_end_to_end_keeps_model_readme() {
        let repo = two_tool_repo();
        let readme = format!(
            "# tools\n\n{}",
            "Tool A does X and tool B does Y, together they cover the workflow. ".repeat(3)
        );
        let provider = CannedProvider::new(ModelReply::Text(model_answer(&readme)));
        let pipeline = UnifyPipeline::new(provider.clone());

        let report = pipeline
            .run(repo.path(), &DiscoveryConfig::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.result.rendered_document, readme);
        assert_eq!(report.source, DocumentSource::Model);
        assert_eq!(report.result.tools.len(), 2);
        assert!(!report.is_degraded());

        let user = provider.last_user.lock().unwrap().clone();
        assert!(user.contains("tool=\"tool-a\""));
        assert!(user.contains("Tool B does Y"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_readme_rendered() {
        let repo = two_tool_repo();
        let provider = CannedProvider::new(ModelReply::Text(model_answer("ok")));
        let report = UnifyPipeline::new(provider)
            .run(repo.path(), &DiscoveryConfig::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            report.result.rendered_document,
            ReadmeRenderer::render(&report.result)
        );
        assert!(report.result.rendered_document.contains("## tool-b"));
    }

    #[tokio::test]
    async fn test_function_call_reply_is_validated() {
        let repo = two_tool_repo();
        let provider = CannedProvider::new(ModelReply::FunctionCall {
            name: "RepositoryAnalysisOutput".to_string(),
            arguments: model_answer("ok"),
        });
        let report = UnifyPipeline::new(provider)
            .run(repo.path(), &DiscoveryConfig::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.result.repo_name, "tools");
    }

    #[tokio::test]
    async fn test_empty_reply_renders_defaults() {
        let repo = two_tool_repo();
        let provider = CannedProvider::new(ModelReply::Empty);
        let report = UnifyPipeline::new(provider)
            .run(repo.path(), &DiscoveryConfig::default())
            .await
            .unwrap()
            .unwrap();

        let dir_name = repo.path().file_name().unwrap().to_string_lossy();
        assert_eq!(report.result.repo_name, dir_name);
        assert_eq!(report.degradations, vec![Degradation::EmptyResponse]);
        assert!(!report.result.rendered_document.is_empty());
    }

    #[tokio::test]
    async fn test_no_documents_skips_model() {
        let temp = TempDir::new().unwrap();
        let provider = CannedProvider::new(ModelReply::Empty);
        let outcome = UnifyPipeline::new(provider.clone())
            .run(temp.path(), &DiscoveryConfig::default())
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auth_failure_is_fatal() {
        let repo = two_tool_repo();
        let err = UnifyPipeline::new(Arc::new(FailingProvider))
            .run(repo.path(), &DiscoveryConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.failure_class(), FailureClass::Connectivity);
    }

    #[tokio::test]
    async fn test_timeout_is_connectivity_error() {
        let repo = two_tool_repo();
        let err = UnifyPipeline::new(Arc::new(StalledProvider))
            .with_timeout(Duration::from_millis(20))
            .run(repo.path(), &DiscoveryConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UnifyError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_force_render_from_config() {
        let repo = two_tool_repo();
        let mut config = Config::default();
        config.output.force_render = true;

        let readme = "A".repeat(400);
        let provider = CannedProvider::new(ModelReply::Text(model_answer(&readme)));
        let report = UnifyPipeline::from_config(provider, &config)
            .run(repo.path(), &config.discovery)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.source, DocumentSource::Renderer);
    }
}
