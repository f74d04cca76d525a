//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Failure Classes
//!
//! - **Configuration**: missing credential, bad endpoint, invalid settings (fatal)
//! - **Connectivity**: endpoint unreachable, auth rejected, timeout (fatal)
//! - **System**: local I/O while walking the root or writing output (fatal)
//!
//! Malformed model output and unreadable individual documents never surface
//! here. They are recovered where they happen and show up as degraded results
//! or warnings instead.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Category of a failed model invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the endpoint
    RateLimit,
    /// Request exceeded the model's context window
    TokenLimit,
    /// Credential rejected
    Auth,
    /// DNS, refused connection, transport timeout
    Network,
    /// Endpoint or deployment not found
    Unavailable,
    /// Endpoint rejected the request shape
    BadRequest,
    /// Server-side failure (5xx)
    Transient,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// One-line hint shown to the user next to the error
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::RateLimit => "The endpoint is throttling requests; wait and run again.",
            Self::TokenLimit => {
                "The collected documents exceed the model's input capacity; \
                 run on a smaller subtree or pick a model with a larger context."
            }
            Self::Auth => "The credential was rejected; verify the API key for this endpoint.",
            Self::Network => "The endpoint could not be reached; check the URL and your network.",
            Self::Unavailable => {
                "The endpoint answered but the model/deployment was not found; \
                 verify the deployment name."
            }
            Self::BadRequest => "The endpoint rejected the request; check the api-version and model.",
            Self::Transient => "The endpoint reported a server error; try again later.",
            Self::Unknown => "The model invocation failed for an unrecognized reason.",
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Model invocation error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for reporting
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw provider failures onto an [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message by its wording
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        let category = if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
        {
            ErrorCategory::RateLimit
        } else if lower.contains("context length")
            || lower.contains("maximum context")
            || (lower.contains("token") && lower.contains("limit"))
        {
            ErrorCategory::TokenLimit
        } else if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("api key")
            || lower.contains("access denied")
        {
            ErrorCategory::Auth
        } else if lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timed out")
            || lower.contains("timeout")
            || lower.contains("unreachable")
        {
            ErrorCategory::Network
        } else if lower.contains("deploymentnotfound")
            || lower.contains("not found")
            || lower.contains("404")
        {
            ErrorCategory::Unavailable
        } else if lower.contains("500")
            || lower.contains("502")
            || lower.contains("503")
            || lower.contains("server error")
            || lower.contains("overloaded")
        {
            ErrorCategory::Transient
        } else if lower.contains("400") || lower.contains("bad request") {
            ErrorCategory::BadRequest
        } else {
            ErrorCategory::Unknown
        };

        LlmError::with_provider(category, message, provider)
    }

    /// Classify an HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => {
                // Azure and OpenAI report context overflow as a 400
                let lower = message.to_lowercase();
                if lower.contains("context_length_exceeded") || lower.contains("maximum context")
                {
                    ErrorCategory::TokenLimit
                } else {
                    ErrorCategory::BadRequest
                }
            }
            404 => ErrorCategory::Unavailable,
            500..=599 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a transport failure from the HTTP client
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        if err.is_timeout() || err.is_connect() {
            return LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider);
        }
        if let Some(status) = err.status() {
            return Self::classify_http_status(status.as_u16(), &err.to_string(), provider);
        }
        Self::classify(&err.to_string(), provider)
    }
}

// =============================================================================
// Failure Class
// =============================================================================

/// How a fatal error is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Configuration,
    Connectivity,
    System,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration Error"),
            Self::Connectivity => write!(f, "Connection Error"),
            Self::System => write!(f, "System Error"),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum UnifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Llm(LlmError),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },
}

impl From<LlmError> for UnifyError {
    fn from(err: LlmError) -> Self {
        UnifyError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, UnifyError>;

impl UnifyError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Which fatal class this error belongs to
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::Config(_) => FailureClass::Configuration,
            Self::Llm(_) | Self::Timeout { .. } => FailureClass::Connectivity,
            Self::Io(_) | Self::Json(_) => FailureClass::System,
        }
    }

    /// Category-specific hint, if there is one
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::Llm(e) => Some(e.category.remediation()),
            Self::Timeout { .. } => Some(ErrorCategory::Network.remediation()),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
