pub mod analysis;
pub mod document;
pub mod error;

pub use analysis::{
    AnalysisReport, AnalysisResult, Degradation, DocumentSource, ResultField, ToolSummary,
};
pub use document::{AnalysisRequest, DocumentRecord, UNNAMED_REPOSITORY, repository_basename};
pub use error::{ErrorCategory, ErrorClassifier, FailureClass, LlmError, Result, UnifyError};
