//! Generate Command
//!
//! Discovers the README files of a repository, asks the model for a unified
//! README, and writes it to the output path.
//!
//! Usage:
//!   unireadme generate <REPO_PATH> [-o PATH] [--provider P] [--model M]
//!                      [--force-render] [--dry-run] [--format text|json]

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::info;

use crate::ai::prompt::RequestBuilder;
use crate::ai::provider::{ProviderConfig, create_provider};
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::types::{AnalysisReport, AnalysisRequest, Degradation, DocumentSource, Result, UnifyError};
use crate::unify::UnifyPipeline;

/// Generate run options (consolidated parameters)
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Repository checkout to analyze
    pub repo_path: PathBuf,
    /// Output file override
    pub output: Option<PathBuf>,
    /// LLM provider override
    pub provider: Option<String>,
    /// Model or deployment override
    pub model: Option<String>,
    /// Always render the document deterministically
    pub force_render: bool,
    /// List documents and prompt size only
    pub dry_run: bool,
    /// Summary format: text, json
    pub format: String,
}

pub fn run(options: GenerateOptions) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    apply_overrides(&mut config, &options);
    run_with_config(&options, &config)
}

/// Fold CLI flags over the loaded configuration
pub fn apply_overrides(config: &mut Config, options: &GenerateOptions) {
    if let Some(ref provider) = options.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(ref model) = options.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(ref output) = options.output {
        config.output.path = output.clone();
    }
    if options.force_render {
        config.output.force_render = true;
    }
}

pub fn run_with_config(options: &GenerateOptions, config: &Config) -> Result<()> {
    let out = Output::new();
    let as_json = options.format == "json";

    check_repo_path(&options.repo_path)?;

    if !as_json {
        out.info(&format!(
            "Searching for README files in {}...",
            options.repo_path.display()
        ));
    }
    let request = UnifyPipeline::collect(&options.repo_path, &config.discovery)?;

    if request.documents.is_empty() {
        if as_json {
            let summary = RunSummary::nothing_found(&request);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            out.info("No README files found. Nothing to do.");
        }
        return Ok(());
    }
    if !as_json {
        out.success(&format!("Found {} README files", request.documents.len()));
    }

    if options.dry_run {
        print_dry_run(&out, &request);
        return Ok(());
    }

    // Credentials and endpoint are checked here, before any network call
    let provider = create_provider(&ProviderConfig::from(&config.llm))?;
    info!("Using LLM provider: {} ({})", provider.name(), provider.model());

    let pipeline = UnifyPipeline::from_config(provider, config);

    if !as_json {
        out.info("Analyzing repository and generating unified README...");
    }
    let rt = Runtime::new()?;
    let report = rt.block_on(pipeline.analyze(&request))?;

    write_document(&config.output.path, &report.result.rendered_document)?;

    if as_json {
        let summary = RunSummary::new(&report, request.documents.len(), &config.output.path);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        out.success(&format!(
            "Unified README saved to {}",
            config.output.path.display()
        ));
        print_summary(&out, &report);
    }

    Ok(())
}

fn check_repo_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(UnifyError::Config(format!(
            "Repository path '{}' does not exist",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(UnifyError::Config(format!(
            "Repository path '{}' is not a directory",
            path.display()
        )));
    }
    Ok(())
}

fn write_document(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, document)?;
    Ok(())
}

fn print_dry_run(out: &Output, request: &AnalysisRequest) {
    out.section("Discovered documents");
    for doc in &request.documents {
        println!(
            "  {:<40} {:<20} {:>8} bytes",
            doc.relative_path,
            doc.owner_label,
            doc.content.len()
        );
    }

    let prompt = RequestBuilder::build(request);
    out.section("[Dry Run] Request");
    out.field("Repository", &request.repository_identifier);
    out.field("Documents", &request.documents.len().to_string());
    out.field("Content", &format!("{} bytes", request.content_bytes()));
    out.field("Prompt", &format!("{} bytes", prompt.len()));
}

fn print_summary(out: &Output, report: &AnalysisReport) {
    let result = &report.result;

    out.section("Repository Analysis Summary");
    out.field("Name", &result.repo_name);
    out.field("Description", &result.repo_description);
    out.field("Tools found", &result.tools.len().to_string());
    for tool in &result.tools {
        println!("    - {}: {}", tool.name, tool.description);
    }
    out.field("Document", source_label(report.source));

    if report.is_degraded() {
        out.section("Degraded result");
        for note in &report.degradations {
            out.warning(&note.to_string());
        }
    }
}

fn source_label(source: DocumentSource) -> &'static str {
    match source {
        DocumentSource::Model => "written by the model",
        DocumentSource::RawResponse => "raw model response",
        DocumentSource::Renderer => "rendered from analysis",
    }
}

/// Machine-readable run summary. `output` and `source` are null when
/// nothing was written.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    repo_name: String,
    repo_description: &'a str,
    document_count: usize,
    tool_count: usize,
    tools: Vec<ToolLine<'a>>,
    output: Option<String>,
    source: Option<DocumentSource>,
    degradations: &'a [Degradation],
}

#[derive(Debug, Serialize)]
struct ToolLine<'a> {
    name: &'a str,
    description: &'a str,
}

impl<'a> RunSummary<'a> {
    fn new(report: &'a AnalysisReport, document_count: usize, output: &Path) -> Self {
        Self {
            repo_name: report.result.repo_name.clone(),
            repo_description: &report.result.repo_description,
            document_count,
            tool_count: report.result.tools.len(),
            tools: report
                .result
                .tools
                .iter()
                .map(|t| ToolLine {
                    name: &t.name,
                    description: &t.description,
                })
                .collect(),
            output: Some(output.display().to_string()),
            source: Some(report.source),
            degradations: &report.degradations,
        }
    }

    fn nothing_found(request: &AnalysisRequest) -> Self {
        Self {
            repo_name: request.repository_name(),
            repo_description: "",
            document_count: 0,
            tool_count: 0,
            tools: Vec::new(),
            output: None,
            source: None,
            degradations: &[],
        }
    }
}
