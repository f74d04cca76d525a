//! Response Validation
//!
//! Turns raw model output into a schema-shaped [`AnalysisResult`]:
//! - Required top-level fields are decoded one at a time, each with its own default
//! - Malformed tool entries are skipped, the rest are kept in order
//! - Text with no recoverable JSON object is returned as [`ParseOutcome::Unparsed`]
//!
//! Nothing here returns an error. Every input maps onto one of the three
//! outcome tags and the caller handles all of them.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::json_repair::{Extraction, JsonExtractor};
use crate::constants::resolution::DEFAULT_REPO_DESCRIPTION;
use crate::types::{AnalysisResult, Degradation, ResultField, ToolSummary, repository_basename};

/// Tagged outcome of decoding one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every field present and well-typed
    Parsed(AnalysisResult),
    /// Valid JSON object, but some fields were defaulted or tools skipped
    PartiallyParsed {
        result: AnalysisResult,
        degradations: Vec<Degradation>,
    },
    /// No JSON object could be recovered
    Unparsed { raw: String },
}

impl ParseOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

/// Validates model responses for one repository
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    repository_identifier: String,
    extractor: JsonExtractor,
}

impl ResponseValidator {
    pub fn new(repository_identifier: impl Into<String>) -> Self {
        Self {
            repository_identifier: repository_identifier.into(),
            extractor: JsonExtractor::new(),
        }
    }

    /// Decode `raw` into one of the outcome tags
    pub fn validate(&self, raw: &str) -> ParseOutcome {
        let Some((value, extraction)) = self.extractor.extract(raw) else {
            warn!("Model response is not JSON, keeping raw text");
            return ParseOutcome::Unparsed {
                raw: raw.to_string(),
            };
        };

        if extraction == Extraction::Repaired {
            debug!("Model response needed JSON repair");
        }

        let Value::Object(object) = value else {
            warn!("Model response is JSON but not an object, keeping raw text");
            return ParseOutcome::Unparsed {
                raw: raw.to_string(),
            };
        };

        if extraction == Extraction::Repaired && !has_schema_key(&object) {
            warn!("Object found in prose has no analysis fields, keeping raw text");
            return ParseOutcome::Unparsed {
                raw: raw.to_string(),
            };
        }

        self.decode_object(&object, raw)
    }

    /// Result used when the response could not be decoded at all
    pub fn unparsed_result(&self, raw: &str) -> AnalysisResult {
        AnalysisResult::new(self.default_repo_name(), DEFAULT_REPO_DESCRIPTION).with_document(raw)
    }

    fn default_repo_name(&self) -> String {
        repository_basename(&self.repository_identifier)
    }

    fn decode_object(&self, object: &Map<String, Value>, raw: &str) -> ParseOutcome {
        let mut degradations = Vec::new();

        let repo_name = string_field(object, ResultField::RepoName)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| {
                degradations.push(defaulted(ResultField::RepoName));
                self.default_repo_name()
            });

        let repo_description = string_field(object, ResultField::RepoDescription)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| {
                degradations.push(defaulted(ResultField::RepoDescription));
                DEFAULT_REPO_DESCRIPTION.to_string()
            });

        let tools = match object.get(ResultField::Tools.key()) {
            Some(Value::Array(entries)) => decode_tools(entries, &mut degradations),
            _ => {
                degradations.push(defaulted(ResultField::Tools));
                Vec::new()
            }
        };

        let rendered_document =
            string_field(object, ResultField::UnifiedReadme).unwrap_or_else(|| {
                degradations.push(defaulted(ResultField::UnifiedReadme));
                raw.to_string()
            });

        let result = AnalysisResult {
            repo_name,
            repo_description,
            tools,
            rendered_document,
        };

        if degradations.is_empty() {
            ParseOutcome::Parsed(result)
        } else {
            ParseOutcome::PartiallyParsed {
                result,
                degradations,
            }
        }
    }
}

/// Salvaged objects only count as a response when they carry a known field
fn has_schema_key(object: &Map<String, Value>) -> bool {
    ResultField::ALL
        .iter()
        .any(|field| object.contains_key(field.key()))
}

fn string_field(object: &Map<String, Value>, field: ResultField) -> Option<String> {
    object
        .get(field.key())
        .and_then(Value::as_str)
        .map(String::from)
}

fn defaulted(field: ResultField) -> Degradation {
    warn!("Response field '{}' missing or mistyped, using default", field);
    Degradation::DefaultedField { field }
}

fn decode_tools(entries: &[Value], degradations: &mut Vec<Degradation>) -> Vec<ToolSummary> {
    entries
        .iter()
        .enumerate()
        .filter_map(
            |(index, entry)| match serde_json::from_value::<ToolSummary>(entry.clone()) {
                Ok(tool) => Some(tool),
                Err(e) => {
                    warn!("Skipping malformed tools[{}]: {}", index, e);
                    degradations.push(Degradation::SkippedTool {
                        index,
                        reason: e.to_string(),
                    });
                    None
                }
            },
        )
        .collect()
}
