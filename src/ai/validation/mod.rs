//! AI Response Validation
//!
//! Recovery layer between the raw model reply and the pipeline:
//! - JSON extraction from fenced or prose-wrapped output
//! - Field-by-field defaulting into a schema-shaped result
//!
//! ## Design Philosophy
//! - Response-shape problems are never fatal; they degrade the result
//! - Every degradation is recorded so the caller can report it

mod json_repair;
mod response;

pub use json_repair::{Extraction, JsonExtractor};
pub use response::{ParseOutcome, ResponseValidator};
