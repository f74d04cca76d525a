use console::style;

use crate::types::{FailureClass, UnifyError};

/// Likely causes printed under every fatal error
const FAILURE_CHECKLIST: [&str; 3] = [
    "Model deployment name (llm.model, AZURE_DEPLOYMENT)",
    "API key and endpoint (AZURE_API_KEY, AZURE_ENDPOINT, OPENAI_API_KEY)",
    "Endpoint availability and network reachability",
];

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Aligned `label: value` line
    pub fn field(&self, label: &str, value: &str) {
        println!("  {:<14} {}", format!("{}:", label), value);
    }

    /// Categorized fatal error with remediation and checklist
    pub fn failure(&self, err: &UnifyError) {
        let class = err.failure_class();
        eprintln!("{} {}", style(format!("{}:", class)).red().bold(), err);

        if let Some(hint) = err.remediation() {
            eprintln!("  {}", style(hint).yellow());
        }

        if class != FailureClass::System {
            eprintln!("\nPlease check:");
            for (i, item) in FAILURE_CHECKLIST.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, item);
            }
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
