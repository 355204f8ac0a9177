//! Data models for the style analyzer.
//!
//! This module contains the records produced by a run: one result per
//! requested article, the derived error list, and the final report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text returned in place of a synthesis when no article was analyzed.
pub const NO_SYNTHESIS_PLACEHOLDER: &str =
    "Could not synthesize style due to lack of successful analyses.";

/// Outcome of fetching and analyzing a single article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisResult {
    /// The article was fetched and the analyzer produced a description.
    Success { url: String, style_analysis: String },
    /// Fetching or analyzing the article failed.
    Failure { url: String, error: String },
}

impl AnalysisResult {
    /// URL this result belongs to.
    pub fn url(&self) -> &str {
        match self {
            AnalysisResult::Success { url, .. } | AnalysisResult::Failure { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success { .. })
    }

    /// Returns the style description for successful results.
    pub fn style_analysis(&self) -> Option<&str> {
        match self {
            AnalysisResult::Success { style_analysis, .. } => Some(style_analysis),
            AnalysisResult::Failure { .. } => None,
        }
    }
}

/// A failed article, as listed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleError {
    pub url: String,
    pub error: String,
}

/// A successful analysis borrowed from the result list, used for synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessfulAnalysis<'a> {
    pub url: &'a str,
    pub style_analysis: &'a str,
}

/// Metadata about a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Model used for per-article analysis.
    pub analyzer_model: String,
    /// Model used for the synthesis step.
    pub synthesizer_model: String,
    /// Number of URLs supplied.
    pub articles_requested: usize,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete output of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub metadata: ReportMetadata,
    /// One entry per input URL, in input order.
    pub individual_analyses: Vec<AnalysisResult>,
    /// Synthesized author style, or the placeholder text.
    pub synthesized_style: String,
    /// Failures among `individual_analyses`, in input order.
    pub errors: Vec<ArticleError>,
}

impl RunReport {
    /// Builds a report, deriving the error list from the analyses.
    pub fn new(
        metadata: ReportMetadata,
        individual_analyses: Vec<AnalysisResult>,
        synthesized_style: String,
    ) -> Self {
        let errors = collect_errors(&individual_analyses);
        Self {
            metadata,
            individual_analyses,
            synthesized_style,
            errors,
        }
    }

    /// Number of successfully analyzed articles.
    pub fn success_count(&self) -> usize {
        self.individual_analyses
            .iter()
            .filter(|a| a.is_success())
            .count()
    }
}

/// Successful analyses, in input order.
pub fn successful_analyses(results: &[AnalysisResult]) -> Vec<SuccessfulAnalysis<'_>> {
    results
        .iter()
        .filter_map(|r| match r {
            AnalysisResult::Success {
                url,
                style_analysis,
            } => Some(SuccessfulAnalysis {
                url,
                style_analysis,
            }),
            AnalysisResult::Failure { .. } => None,
        })
        .collect()
}

/// Failed analyses, in input order.
pub fn collect_errors(results: &[AnalysisResult]) -> Vec<ArticleError> {
    results
        .iter()
        .filter_map(|r| match r {
            AnalysisResult::Failure { url, error } => Some(ArticleError {
                url: url.clone(),
                error: error.clone(),
            }),
            AnalysisResult::Success { .. } => None,
        })
        .collect()
}
