//! Two-phase run orchestration.
//!
//! Phase 1 fetches and analyzes every URL concurrently and waits for all of
//! them, whatever their outcome. Phase 2 synthesizes once over the
//! successful subset.

use crate::agent::Agent;
use crate::analysis::synthesis::{analysis_prompt, synthesize};
use crate::fetcher::ArticleSource;
use crate::models::{successful_analyses, AnalysisResult, ReportMetadata, RunReport};
use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of fetching one URL without analyzing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchProbe {
    pub url: String,
    /// Body size in bytes, or the error message.
    pub outcome: Result<usize, String>,
}

/// Drives fetching, analysis and synthesis for a set of URLs.
pub struct Pipeline {
    source: Arc<dyn ArticleSource>,
    analyzer: Agent,
    synthesizer: Agent,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(source: Arc<dyn ArticleSource>, analyzer: Agent, synthesizer: Agent) -> Self {
        Self {
            source,
            analyzer,
            synthesizer,
            show_progress: false,
        }
    }

    /// Show a progress bar on stderr while articles are processed.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Analyze every URL and synthesize a combined style.
    ///
    /// Per-URL failures end up in the report. A synthesis failure is
    /// returned as an error.
    pub async fn analyze_articles(&self, urls: &[String]) -> Result<RunReport> {
        let start_time = Instant::now();
        info!("Starting analysis of {} articles...", urls.len());

        let progress = self.progress_bar(urls.len());
        let individual_analyses: Vec<AnalysisResult> = join_all(urls.iter().map(|url| {
            let progress = &progress;
            async move {
                let result = self.fetch_and_analyze(url).await;
                progress.inc(1);
                result
            }
        }))
        .await;
        progress.finish_and_clear();

        let successes = successful_analyses(&individual_analyses);
        let failed = individual_analyses.len() - successes.len();
        info!("Completed {} successful analyses", successes.len());
        if failed > 0 {
            warn!("Encountered {} errors", failed);
        }

        let synthesized_style = synthesize(&self.synthesizer, &successes).await?;

        let metadata = ReportMetadata {
            generated_at: Utc::now(),
            analyzer_model: self.analyzer.config().model.clone(),
            synthesizer_model: self.synthesizer.config().model.clone(),
            articles_requested: urls.len(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        };

        Ok(RunReport::new(metadata, individual_analyses, synthesized_style))
    }

    async fn fetch_and_analyze(&self, url: &str) -> AnalysisResult {
        match self.analyze_url(url).await {
            Ok(style_analysis) => {
                debug!("Analyzed {}", url);
                AnalysisResult::Success {
                    url: url.to_string(),
                    style_analysis,
                }
            }
            Err(e) => {
                let error = format!("{:#}", e);
                warn!("Failed to analyze {}: {}", url, error);
                AnalysisResult::Failure {
                    url: url.to_string(),
                    error,
                }
            }
        }
    }

    async fn analyze_url(&self, url: &str) -> Result<String> {
        let content = self.source.fetch(url).await?;
        self.analyzer.run(&analysis_prompt(&content)).await
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress || len == 0 {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} articles")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

/// Fetch every URL concurrently without calling any model.
pub async fn probe_articles(source: &dyn ArticleSource, urls: &[String]) -> Vec<FetchProbe> {
    join_all(urls.iter().map(|url| async move {
        let outcome = source
            .fetch(url)
            .await
            .map(|body| body.len())
            .map_err(|e| e.to_string());
        FetchProbe {
            url: url.clone(),
            outcome,
        }
    }))
    .await
}
