//! Report rendering.
//!
//! This module turns a [`RunReport`] into the text printed on stdout, or
//! into JSON.

use crate::models::{AnalysisResult, ArticleError, RunReport};
use anyhow::Result;

const HEAVY_RULE: &str =
    "================================================================================";
const LIGHT_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Generate the human-readable report.
pub fn generate_text_report(report: &RunReport, show_analyses: bool) -> String {
    let mut output = String::new();

    // Header
    output.push_str(&format!("{}\n", HEAVY_RULE));
    output.push_str("WRITING STYLE ANALYSIS RESULTS\n");
    output.push_str(&format!("{}\n\n", HEAVY_RULE));

    output.push_str(&format!(
        "Articles analyzed: {} of {}\n\n",
        report.success_count(),
        report.individual_analyses.len()
    ));

    output.push_str(&generate_errors_section(&report.errors));

    if show_analyses {
        output.push_str(&generate_analyses_section(&report.individual_analyses));
    }

    // Synthesis
    output.push_str("SYNTHESIZED WRITING STYLE:\n");
    output.push_str(&format!("{}\n", LIGHT_RULE));
    output.push_str(report.synthesized_style.trim_end());
    output.push('\n');
    output.push_str(&format!("{}\n", LIGHT_RULE));

    output
}

/// Generate the errors section. Empty when nothing failed.
fn generate_errors_section(errors: &[ArticleError]) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let mut section = String::from("ERRORS:\n");
    for error in errors {
        section.push_str(&format!("  - {}: {}\n", error.url, error.error));
    }
    section.push('\n');

    section
}

/// Generate the per-article section.
fn generate_analyses_section(results: &[AnalysisResult]) -> String {
    let analyses: Vec<_> = results
        .iter()
        .filter_map(|r| r.style_analysis().map(|text| (r.url(), text)))
        .collect();

    if analyses.is_empty() {
        return String::new();
    }

    let mut section = String::from("INDIVIDUAL ANALYSES:\n");
    for (i, (url, text)) in analyses.iter().enumerate() {
        section.push_str(&format!("\nArticle {} ({}):\n", i + 1, url));
        section.push_str(text.trim_end());
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
