//! Deterministic README Renderer
//!
//! Canonical markdown built only from the structured fields of an
//! [`AnalysisResult`]; `rendered_document` is never read. Output depends on
//! nothing but the input: no timestamps, no locale, no hashing order.

use crate::types::{AnalysisResult, ToolSummary};

/// Tool count above which a table of contents is emitted
const TOC_MIN_TOOLS: usize = 3;

/// Renders the unified README from structured analysis data
pub struct ReadmeRenderer;

impl ReadmeRenderer {
    /// Render the full document. Always non-empty.
    pub fn render(result: &AnalysisResult) -> String {
        let mut output = String::new();

        // Title
        output.push_str(&format!("# {}\n\n", result.repo_name.trim()));
        output.push_str(&format!("{}\n\n", result.repo_description.trim()));

        if result.tools.len() >= TOC_MIN_TOOLS {
            Self::push_toc(&mut output, &result.tools);
        }

        Self::push_overview(&mut output, &result.tools);

        for tool in &result.tools {
            Self::push_tool(&mut output, tool);
        }

        // Installation
        output.push_str("## Installation\n\n");
        output.push_str("```bash\n");
        output.push_str(&format!(
            "git clone <repository-url> {slug}\ncd {slug}\n",
            slug = repo_slug(&result.repo_name)
        ));
        output.push_str("```\n\n");

        // Usage
        output.push_str("## Usage\n\n");
        output.push_str("See the individual tool sections above for usage details.\n");

        output
    }

    fn push_toc(output: &mut String, tools: &[ToolSummary]) {
        output.push_str("## Table of Contents\n\n");
        for tool in tools {
            output.push_str(&format!(
                "- [{}](#{})\n",
                tool.name.trim(),
                heading_anchor(&tool.name)
            ));
        }
        output.push_str("- [Installation](#installation)\n");
        output.push_str("- [Usage](#usage)\n\n");
    }

    fn push_overview(output: &mut String, tools: &[ToolSummary]) {
        output.push_str("## Overview\n\n");
        let noun = if tools.len() == 1 { "tool" } else { "tools" };
        output.push_str(&format!(
            "This repository contains {} {}.\n\n",
            tools.len(),
            noun
        ));

        if tools.is_empty() {
            return;
        }
        for tool in tools {
            output.push_str(&format!(
                "- **{}**: {}\n",
                tool.name.trim(),
                tool.description.trim()
            ));
        }
        output.push('\n');
    }

    fn push_tool(output: &mut String, tool: &ToolSummary) {
        output.push_str(&format!("## {}\n\n", tool.name.trim()));
        output.push_str(&format!("{}\n\n", tool.description.trim()));

        if !tool.key_features.is_empty() {
            output.push_str("### Key Features\n\n");
            for feature in &tool.key_features {
                output.push_str(&format!("- {}\n", feature.trim()));
            }
            output.push('\n');
        }

        if let Some(usage) = tool.usage() {
            output.push_str("### Usage Example\n\n");
            output.push_str("```\n");
            output.push_str(usage.trim_end());
            output.push_str("\n```\n\n");
        }
    }
}

/// Anchor for a tool heading: lowercased, spaces and underscores to hyphens
pub fn heading_anchor(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '_'], "-")
}

/// Directory slug for the clone snippet: lowercased, spaces to hyphens
pub fn repo_slug(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tool(name: &str) -> ToolSummary {
        ToolSummary::new(name, format!("{} description", name))
    }

    fn sample(tools: Vec<ToolSummary>) -> AnalysisResult {
        AnalysisResult::new("Multi Tools", "A set of tools").with_tools(tools)
    }

    #[test]
    fn test_zero_tools_is_total() {
        let output = ReadmeRenderer::render(&sample(vec![]));

        assert!(output.starts_with("# Multi Tools\n\nA set of tools\n\n"));
        assert!(output.contains("## Overview\n\nThis repository contains 0 tools."));
        assert!(output.contains("## Installation"));
        assert!(output.contains("git clone <repository-url> multi-tools\ncd multi-tools"));
        assert!(output.contains("## Usage"));
        assert!(!output.contains("Table of Contents"));
    }

    #[test]
    fn test_toc_only_above_two_tools() {
        let two = ReadmeRenderer::render(&sample(vec![tool("a"), tool("b")]));
        assert!(!two.contains("## Table of Contents"));

        let three = ReadmeRenderer::render(&sample(vec![
            tool("Code Search"),
            tool("log_parser"),
            tool("c"),
        ]));
        let toc_start = three.find("## Table of Contents").unwrap();
        let overview = three.find("## Overview").unwrap();
        assert!(toc_start < overview);
        assert!(three.contains(
            "- [Code Search](#code-search)\n- [log_parser](#log-parser)\n- [c](#c)\n- [Installation](#installation)\n- [Usage](#usage)\n"
        ));
    }

    #[test]
    fn test_section_order() {
        let output = ReadmeRenderer::render(&sample(vec![
            tool("tool-a").with_features(["fast"]).with_usage("tool-a --run"),
            tool("tool-b"),
        ]));

        let positions: Vec<usize> = [
            "## Overview",
            "- **tool-a**: tool-a description",
            "- **tool-b**: tool-b description",
            "## tool-a",
            "### Key Features\n\n- fast",
            "### Usage Example\n\n```\ntool-a --run\n```",
            "## tool-b",
            "## Installation",
            "## Usage\n\nSee",
        ]
        .iter()
        .map(|needle| output.find(needle).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_subsections_omitted() {
        let output = ReadmeRenderer::render(&sample(vec![tool("bare").with_usage("   ")]));
        assert!(!output.contains("### Key Features"));
        assert!(!output.contains("### Usage Example"));
        assert!(output.contains("This repository contains 1 tool."));
    }

    #[test]
    fn test_ignores_rendered_document() {
        let a = sample(vec![tool("x")]);
        let b = a.clone().with_document("model text");
        assert_eq!(ReadmeRenderer::render(&a), ReadmeRenderer::render(&b));
    }

    fn arb_tool() -> impl Strategy<Value = ToolSummary> {
        (
            "[A-Za-z_ -]{1,16}",
            "[ -~]{0,40}",
            prop::collection::vec("[ -~]{0,20}", 0..4),
            prop::option::of("[ -~]{0,30}"),
        )
            .prop_map(|(name, description, features, usage)| ToolSummary {
                name,
                description,
                key_features: features,
                usage_example: usage,
            })
    }

    proptest! {
        #[test]
        fn prop_render_is_deterministic(
            name in "[ -~]{0,24}",
            description in "[ -~]{0,60}",
            tools in prop::collection::vec(arb_tool(), 0..6),
        ) {
            let result = AnalysisResult::new(name, description).with_tools(tools);
            let first = ReadmeRenderer::render(&result);
            let second = ReadmeRenderer::render(&result);
            prop_assert_eq!(&first, &second);
            prop_assert!(!first.trim().is_empty());
            prop_assert!(first.contains("## Installation"));
        }

        #[test]
        fn prop_anchor_has_no_spaces_or_underscores(name in "[A-Za-z0-9 _-]{0,32}") {
            let anchor = heading_anchor(&name);
            prop_assert!(!anchor.contains(' '));
            prop_assert!(!anchor.contains('_'));
            prop_assert_eq!(anchor.clone(), anchor.to_lowercase());
        }
    }
}
