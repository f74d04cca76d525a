//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Discovery constants
pub mod discovery {
    /// File name pattern for candidate documents (matched case-insensitively)
    pub const DEFAULT_PATTERN: &str = "README*";

    /// Version-control metadata directories never descended into
    pub const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];
}

/// Response resolution constants
pub mod resolution {
    /// Model-written documents shorter than this (in chars) are re-rendered
    pub const MIN_RENDERED_CHARS: usize = 100;

    /// Description used when the model supplied none
    pub const DEFAULT_REPO_DESCRIPTION: &str = "Repository analysis results";
}

/// Output constants
pub mod output {
    /// Default path of the unified document
    pub const DEFAULT_OUTPUT_PATH: &str = "UNIFIED_README.md";
}

/// LLM endpoint constants
pub mod llm {
    /// Azure OpenAI REST api-version
    pub const AZURE_API_VERSION: &str = "2024-12-01-preview";

    /// Azure deployment used when none is configured
    pub const AZURE_DEFAULT_DEPLOYMENT: &str = "gpt4o";

    /// Default completion budget
    pub const DEFAULT_MAX_TOKENS: usize = 4096;

    /// Function name used with the function calling convention
    pub const ANALYSIS_FUNCTION_NAME: &str = "RepositoryAnalysisOutput";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
