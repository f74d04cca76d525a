//! Prompt Builder System
//!
//! Standardized prompt construction for the repository analysis request.
//!
//! The system block is a fixed policy artifact: persona, analysis steps,
//! output instructions and the exact output schema. It does not vary per
//! repository. The user block carries the discovered documents verbatim;
//! nothing is truncated or budgeted here.

use serde_json::{Value, json};

use crate::types::AnalysisRequest;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Bulleted list under a header
    Bullets { header: String, items: Vec<String> },
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Code block with language
    Code { language: String, content: String },
    /// Anti-patterns with good/bad examples
    AntiPatterns { bad: Vec<String>, good: Vec<String> },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives(mut self, objectives: &[&str]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Add a bulleted list with header
    pub fn bullets(mut self, header: &str, items: &[&str]) -> Self {
        self.sections.push(PromptSection::Bullets {
            header: header.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add code block
    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add anti-patterns section
    pub fn anti_patterns(mut self, bad: &[&str], good: &[&str]) -> Self {
        self.sections.push(PromptSection::AntiPatterns {
            bad: bad.iter().map(|s| s.to_string()).collect(),
            good: good.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<STEPS>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</STEPS>\n\n");
                }
                PromptSection::Bullets { header, items } => {
                    prompt.push_str(&format!("# {}\n\n", header));
                    for item in items {
                        prompt.push_str(&format!("- {}\n", item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
                PromptSection::AntiPatterns { bad, good } => {
                    prompt.push_str("<what_not_to_do>\n");
                    for example in bad {
                        prompt.push_str(&format!("WRONG: {}\n", example));
                    }
                    prompt.push_str("</what_not_to_do>\n\n");
                    prompt.push_str("<what_to_do>\n");
                    for example in good {
                        prompt.push_str(&format!("CORRECT: {}\n", example));
                    }
                    prompt.push_str("</what_to_do>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Analysis Request
// =============================================================================

/// Payload handed to a provider: one system block, one user block
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system: String,
    pub user: String,
    /// JSON Schema the response must satisfy
    pub schema: Value,
}

impl ModelRequest {
    /// Combined size of both blocks in bytes
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the single request sent for a repository
pub struct RequestBuilder;

impl RequestBuilder {
    /// Assemble the full request for one run
    pub fn build(request: &AnalysisRequest) -> ModelRequest {
        ModelRequest {
            system: Self::system_prompt(),
            user: Self::user_prompt(request),
            schema: Self::output_schema(),
        }
    }

    /// JSON Schema of the expected response
    pub fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo_name": {
                    "type": "string",
                    "description": "Name of the repository."
                },
                "repo_description": {
                    "type": "string",
                    "description": "Brief description of the repository."
                },
                "tools": {
                    "type": "array",
                    "description": "List of tools found in the repository.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {
                                "type": "string",
                                "description": "Name of the tool."
                            },
                            "description": {
                                "type": "string",
                                "description": "Brief description of the tool."
                            },
                            "key_features": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Key features of the tool."
                            },
                            "usage_example": {
                                "type": ["string", "null"],
                                "description": "Example of how to use the tool."
                            }
                        },
                        "required": ["name", "description", "key_features"]
                    }
                },
                "unified_readme": {
                    "type": "string",
                    "description": "Unified README content for the repository, in markdown."
                }
            },
            "required": ["repo_name", "repo_description", "tools", "unified_readme"]
        })
    }

    /// Fixed instruction block
    pub fn system_prompt() -> String {
        let schema = serde_json::to_string_pretty(&Self::output_schema()).unwrap_or_default();

        PromptBuilder::new()
            .role(
                "repository analyzer",
                "creating unified documentation for multi-tool repositories",
            )
            .bullets(
                "Background",
                &[
                    "You receive the README files of the different tools in one repository.",
                    "Your task is to analyze them and create a single unified README.",
                    "The unified README should give a clear overview of the repository and its tools.",
                ],
            )
            .objectives(&[
                "Analyze each README file to understand the purpose and features of each tool.",
                "Identify common themes and relationships between the tools.",
                "Extract key information about each tool: name, description, key features and a usage example.",
                "Create a unified README that gives a user-friendly overview of the entire repository.",
            ])
            .bullets(
                "Output Instructions",
                &[
                    "The unified README must be well-structured with clear headings and sections.",
                    "Include an introduction to the repository as a whole.",
                    "For each tool, give a concise description and highlight its key features.",
                    "Include installation and usage instructions where the sources provide them.",
                    "Keep the README informative but not excessively long.",
                    "Use markdown formatting for readability.",
                ],
            )
            .anti_patterns(
                &[
                    "Wrapping the JSON in prose or explanations",
                    "Inventing tools that have no README in the input",
                ],
                &[
                    "A single JSON object matching the schema, nothing else",
                    "One entry in `tools` per tool documented in the input",
                ],
            )
            .section(
                "Output Schema",
                "Respond with valid JSON matching this schema exactly:",
            )
            .code("json", &schema)
            .text("Respond ONLY with valid JSON, no explanation.")
            .build()
    }

    /// Per-run block with every document in locator order
    pub fn user_prompt(request: &AnalysisRequest) -> String {
        let mut prompt = format!(
            "Repository: {}\nREADME files: {}\n\n",
            request.repository_identifier,
            request.documents.len()
        );

        for doc in &request.documents {
            prompt.push_str(&format!(
                "<DOCUMENT path=\"{}\" tool=\"{}\">\n",
                doc.relative_path, doc.owner_label
            ));
            prompt.push_str(&doc.content);
            if !doc.content.ends_with('\n') {
                prompt.push('\n');
            }
            prompt.push_str("</DOCUMENT>\n\n");
        }

        prompt.trim_end().to_string()
    }
}
