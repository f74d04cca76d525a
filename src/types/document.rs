//! Discovered documentation files and the request built from them.

use serde::Serialize;

/// Fallback name when nothing usable can be derived from a path
pub const UNNAMED_REPOSITORY: &str = "repository";

/// One documentation file found during a discovery pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    /// Path relative to the repository root, `/`-separated
    pub relative_path: String,
    /// Full file text, never truncated
    pub content: String,
    /// Tool the file belongs to (immediate parent directory name)
    pub owner_label: String,
}

impl DocumentRecord {
    pub fn new(
        relative_path: impl Into<String>,
        content: impl Into<String>,
        owner_label: impl Into<String>,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: content.into(),
            owner_label: owner_label.into(),
        }
    }
}

/// Everything the model sees for one run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    /// URL or path of the repository, opaque to the pipeline
    pub repository_identifier: String,
    /// Documents in locator order
    pub documents: Vec<DocumentRecord>,
}

impl AnalysisRequest {
    pub fn new(repository_identifier: impl Into<String>, documents: Vec<DocumentRecord>) -> Self {
        Self {
            repository_identifier: repository_identifier.into(),
            documents,
        }
    }

    /// Default repository name derived from the identifier
    pub fn repository_name(&self) -> String {
        repository_basename(&self.repository_identifier)
    }

    /// Total bytes of document content
    pub fn content_bytes(&self) -> usize {
        self.documents.iter().map(|d| d.content.len()).sum()
    }
}

/// Last meaningful segment of a path or URL.
///
/// Accepts both separators, ignores trailing separators and strips a `.git`
/// suffix so `https://host/org/tools.git` and `./tools/` both yield `tools`.
pub fn repository_basename(identifier: &str) -> String {
    identifier
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .last()
        .map(|s| s.strip_suffix(".git").unwrap_or(s))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| UNNAMED_REPOSITORY.to_string())
}
