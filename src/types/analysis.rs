//! Analysis result model
//!
//! Field names on the wire follow the schema the model is asked to emit, so
//! `rendered_document` travels as `unified_readme`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The model's understanding of one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    /// Required on the wire, may be empty
    pub key_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_example: Option<String>,
}

impl ToolSummary {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            key_features: Vec::new(),
            usage_example: None,
        }
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage_example = Some(usage.into());
        self
    }

    /// Usage example if it carries any text
    pub fn usage(&self) -> Option<&str> {
        self.usage_example
            .as_deref()
            .filter(|u| !u.trim().is_empty())
    }
}

/// Validated outcome of one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub repo_name: String,
    pub repo_description: String,
    pub tools: Vec<ToolSummary>,
    /// Final markdown, model-written or rendered
    #[serde(rename = "unified_readme")]
    pub rendered_document: String,
}

impl AnalysisResult {
    pub fn new(repo_name: impl Into<String>, repo_description: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            repo_description: repo_description.into(),
            tools: Vec::new(),
            rendered_document: String::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSummary>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.rendered_document = document.into();
        self
    }
}

// =============================================================================
// Degradation Reporting
// =============================================================================

/// Top-level fields of the output schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultField {
    RepoName,
    RepoDescription,
    Tools,
    UnifiedReadme,
}

impl ResultField {
    pub const ALL: [ResultField; 4] = [
        ResultField::RepoName,
        ResultField::RepoDescription,
        ResultField::Tools,
        ResultField::UnifiedReadme,
    ];

    /// Key used in the model's JSON
    pub fn key(&self) -> &'static str {
        match self {
            Self::RepoName => "repo_name",
            Self::RepoDescription => "repo_description",
            Self::Tools => "tools",
            Self::UnifiedReadme => "unified_readme",
        }
    }
}

impl fmt::Display for ResultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a result is not a clean structured parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// Field missing or mistyped, default substituted
    DefaultedField { field: ResultField },
    /// Tool entry dropped because it did not match the schema
    SkippedTool { index: usize, reason: String },
    /// Response was not a JSON object
    Unparsed,
    /// Model returned no content at all
    EmptyResponse,
    /// Model-written document replaced because it was too short
    ShortDocument { chars: usize, threshold: usize },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultedField { field } => write!(f, "'{}' missing, default used", field),
            Self::SkippedTool { index, reason } => {
                write!(f, "tools[{}] skipped: {}", index, reason)
            }
            Self::Unparsed => write!(f, "response was not JSON, raw text kept"),
            Self::EmptyResponse => write!(f, "model returned an empty response"),
            Self::ShortDocument { chars, threshold } => write!(
                f,
                "unified_readme too short ({} < {} chars), re-rendered",
                chars, threshold
            ),
        }
    }
}

/// Where the final document text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    /// The model's own `unified_readme`
    Model,
    /// Raw response text surfaced verbatim
    RawResponse,
    /// Deterministic renderer
    Renderer,
}

/// Final pipeline artifact plus how it was obtained
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub source: DocumentSource,
    pub degradations: Vec<Degradation>,
}

impl AnalysisReport {
    /// Produced through a fallback path rather than a full structured parse
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
