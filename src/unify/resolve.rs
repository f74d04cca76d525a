//! Final document resolution
//!
//! Decides whether the model's own `unified_readme` survives or is replaced
//! by the deterministic renderer:
//!
//! | Outcome | Document |
//! |---|---|
//! | `force_render` set | always rendered |
//! | Parsed / PartiallyParsed, candidate >= threshold | kept verbatim |
//! | Parsed / PartiallyParsed, candidate < threshold | rendered |
//! | Unparsed, non-blank raw text | raw text kept verbatim |
//! | Unparsed with blank text, or empty reply | rendered |
//!
//! The threshold counts chars of the trimmed candidate.

use tracing::{info, warn};

use super::renderer::ReadmeRenderer;
use crate::ai::validation::{ParseOutcome, ResponseValidator};
use crate::config::OutputConfig;
use crate::constants::resolution::MIN_RENDERED_CHARS;
use crate::types::{AnalysisReport, AnalysisResult, Degradation, DocumentSource, ResultField};

/// Turns a parse outcome into the final report
#[derive(Debug, Clone)]
pub struct ResultResolver {
    min_rendered_chars: usize,
    force_render: bool,
}

impl Default for ResultResolver {
    fn default() -> Self {
        Self {
            min_rendered_chars: MIN_RENDERED_CHARS,
            force_render: false,
        }
    }
}

impl ResultResolver {
    pub fn new(min_rendered_chars: usize) -> Self {
        Self {
            min_rendered_chars,
            ..Default::default()
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.min_rendered_chars).force_render(config.force_render)
    }

    pub fn force_render(mut self, force: bool) -> Self {
        self.force_render = force;
        self
    }

    pub fn resolve(&self, outcome: ParseOutcome, validator: &ResponseValidator) -> AnalysisReport {
        match outcome {
            ParseOutcome::Parsed(result) => self.resolve_structured(result, Vec::new()),
            ParseOutcome::PartiallyParsed {
                result,
                degradations,
            } => self.resolve_structured(result, degradations),
            ParseOutcome::Unparsed { raw } => {
                let result = validator.unparsed_result(&raw);
                self.resolve_raw(result, vec![Degradation::Unparsed])
            }
        }
    }

    /// Report for a reply that carried no content at all
    pub fn resolve_empty(&self, validator: &ResponseValidator) -> AnalysisReport {
        warn!("Model returned an empty response, rendering from defaults");
        let result = validator.unparsed_result("");
        self.resolve_raw(result, vec![Degradation::EmptyResponse])
    }

    fn resolve_structured(
        &self,
        result: AnalysisResult,
        mut degradations: Vec<Degradation>,
    ) -> AnalysisReport {
        if self.force_render {
            info!("Rendering unified README deterministically (forced)");
            return rendered(result, degradations);
        }

        let chars = result.rendered_document.trim().chars().count();
        if chars < self.min_rendered_chars {
            warn!(
                "Model README too short ({} < {} chars), rendering instead",
                chars, self.min_rendered_chars
            );
            degradations.push(Degradation::ShortDocument {
                chars,
                threshold: self.min_rendered_chars,
            });
            return rendered(result, degradations);
        }

        let readme_defaulted = degradations.contains(&Degradation::DefaultedField {
            field: ResultField::UnifiedReadme,
        });
        let source = if readme_defaulted {
            DocumentSource::RawResponse
        } else {
            DocumentSource::Model
        };

        AnalysisReport {
            result,
            source,
            degradations,
        }
    }

    fn resolve_raw(&self, result: AnalysisResult, degradations: Vec<Degradation>) -> AnalysisReport {
        if self.force_render || result.rendered_document.trim().is_empty() {
            return rendered(result, degradations);
        }

        AnalysisReport {
            result,
            source: DocumentSource::RawResponse,
            degradations,
        }
    }
}

fn rendered(mut result: AnalysisResult, degradations: Vec<Degradation>) -> AnalysisReport {
    result.rendered_document = ReadmeRenderer::render(&result);
    AnalysisReport {
        result,
        source: DocumentSource::Renderer,
        degradations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> ResponseValidator {
        ResponseValidator::new("/work/multi-tools")
    }

    fn resolve(raw: &str, resolver: &ResultResolver) -> AnalysisReport {
        let validator = validator();
        resolver.resolve(validator.validate(raw), &validator)
    }

    fn two_tool_response(readme: &str) -> String {
        json!({
            "repo_name": "multi-tools",
            "repo_description": "A set of tools",
            "tools": [
                {"name": "tool-a", "description": "Tool A does X", "key_features": ["X"]},
                {"name": "tool-b", "description": "Tool B does Y", "key_features": ["Y"]}
            ],
            "unified_readme": readme
        })
        .to_string()
    }

    #[test]
    fn test_not_json_keeps_raw_text() {
        let report = resolve("not json at all", &ResultResolver::default());

        assert_eq!(report.result.rendered_document, "not json at all");
        assert!(report.result.tools.is_empty());
        assert_eq!(report.source, DocumentSource::RawResponse);
        assert_eq!(report.degradations, vec![Degradation::Unparsed]);
    }

    #[test]
    fn test_short_prose_with_braces_keeps_raw_text() {
        let raw = "Run `tool {}` to start.";
        let report = resolve(raw, &ResultResolver::default());

        assert_eq!(report.result.rendered_document, raw);
        assert_eq!(report.source, DocumentSource::RawResponse);
        assert_eq!(report.degradations, vec![Degradation::Unparsed]);
    }

    #[test]
    fn test_short_readme_is_rendered() {
        let report = resolve(&two_tool_response("ok"), &ResultResolver::default());

        let expected = ReadmeRenderer::render(&report.result);
        assert_ne!(report.result.rendered_document, "ok");
        assert_eq!(report.result.rendered_document, expected);
        assert_eq!(report.source, DocumentSource::Renderer);
        assert_eq!(
            report.degradations,
            vec![Degradation::ShortDocument {
                chars: 2,
                threshold: MIN_RENDERED_CHARS
            }]
        );
    }

    #[test]
    fn test_long_readme_kept_verbatim() {
        let readme = format!("# multi-tools\n\n{}", "Tool A does X. Tool B does Y. ".repeat(10));
        let report = resolve(&two_tool_response(&readme), &ResultResolver::default());

        assert_eq!(report.result.rendered_document, readme);
        assert_eq!(report.source, DocumentSource::Model);
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_force_render_replaces_long_readme() {
        let readme = "x".repeat(500);
        let resolver = ResultResolver::default().force_render(true);
        let report = resolve(&two_tool_response(&readme), &resolver);

        assert!(report.result.rendered_document.starts_with("# multi-tools"));
        assert_eq!(report.source, DocumentSource::Renderer);
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_threshold_counts_chars_not_bytes() {
        let readme = "é".repeat(60);
        let resolver = ResultResolver::new(100);
        let report = resolve(&two_tool_response(&readme), &resolver);
        assert_eq!(report.source, DocumentSource::Renderer);

        let report = resolve(&two_tool_response(&readme), &ResultResolver::new(60));
        assert_eq!(report.source, DocumentSource::Model);
    }

    #[test]
    fn test_missing_readme_falls_back_to_raw_json() {
        let raw = json!({
            "repo_name": "multi-tools",
            "repo_description": "A set of tools that is described at some length here",
            "tools": [{"name": "tool-a", "description": "Tool A does X", "key_features": []}]
        })
        .to_string();
        let report = resolve(&raw, &ResultResolver::default());

        assert_eq!(report.result.rendered_document, raw);
        assert_eq!(report.source, DocumentSource::RawResponse);
        assert_eq!(report.result.tools.len(), 1);
    }

    #[test]
    fn test_blank_raw_text_is_rendered() {
        let report = resolve("   \n", &ResultResolver::default());
        assert_eq!(report.source, DocumentSource::Renderer);
        assert!(report.result.rendered_document.contains("## Installation"));
    }

    #[test]
    fn test_empty_reply_is_rendered() {
        let report = ResultResolver::default().resolve_empty(&validator());
        assert_eq!(report.source, DocumentSource::Renderer);
        assert_eq!(report.degradations, vec![Degradation::EmptyResponse]);
        assert!(report.result.rendered_document.starts_with("# multi-tools"));
    }
}
