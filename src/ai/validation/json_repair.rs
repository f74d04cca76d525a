//! JSON Extraction
//!
//! Recovers a JSON object from model output that is not clean JSON:
//! - Markdown code fence wrapping (```json ... ```)
//! - Byte-order mark
//! - JSON object embedded in explanatory text
//! - Trailing commas
//!
//! Extraction never fails loudly; `None` means the caller should treat the
//! text as unparsed prose.

use serde_json::Value;
use tracing::debug;

/// What extraction had to do to get a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Parsed as-is after fence/BOM stripping
    Clean,
    /// Object cut out of surrounding prose or trailing commas removed
    Repaired,
}

/// Finds a JSON value inside raw model output
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExtractor;

impl JsonExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parse `raw`, falling back to an embedded object, then to a
    /// trailing-comma fix of that object.
    pub fn extract(&self, raw: &str) -> Option<(Value, Extraction)> {
        let cleaned = self.preprocess(raw);

        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Some((value, Extraction::Clean));
        }

        debug!("Initial JSON parse failed, looking for an embedded object");

        let candidate = self.embedded_object(&cleaned)?;
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Some((value, Extraction::Repaired));
        }

        let fixed = self.fix_trailing_commas(candidate);
        match serde_json::from_str::<Value>(&fixed) {
            Ok(value) => Some((value, Extraction::Repaired)),
            Err(e) => {
                debug!("Embedded object still not JSON: {}", e);
                None
            }
        }
    }

    fn preprocess(&self, raw: &str) -> String {
        let s = raw.trim().trim_start_matches('\u{feff}').trim();
        self.strip_code_fences(s).trim().to_string()
    }

    /// Strip one surrounding markdown code fence
    fn strip_code_fences<'a>(&self, s: &'a str) -> &'a str {
        let mut result = s;

        if result.starts_with("```")
            && let Some(first_newline) = result.find('\n')
        {
            result = &result[first_newline + 1..];
        }

        if let Some(stripped) = result.trim_end().strip_suffix("```") {
            result = stripped;
        }

        result
    }

    /// First balanced `{...}` span, string-literal aware
    fn embedded_object<'a>(&self, s: &'a str) -> Option<&'a str> {
        let start = s.find('{')?;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escape = false;

        for (i, ch) in s[start..].char_indices() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&s[start..start + i + 1]);
                    }
                }
                _ => {}
            }
        }

        None
    }

    /// Drop commas directly before `]` or `}` outside string literals
    fn fix_trailing_commas(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        let mut in_string = false;
        let mut escape = false;

        for (i, &ch) in chars.iter().enumerate() {
            if escape {
                escape = false;
                result.push(ch);
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                ',' if !in_string => {
                    let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                    if matches!(next, Some(']') | Some('}')) {
                        continue;
                    }
                }
                _ => {}
            }

            result.push(ch);
        }

        result
    }
}
