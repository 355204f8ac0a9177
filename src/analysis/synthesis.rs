//! Prompt construction for both analysis phases and the synthesis step.

use crate::agent::Agent;
use crate::models::{SuccessfulAnalysis, NO_SYNTHESIS_PLACEHOLDER};
use anyhow::Result;
use tracing::info;

/// Prompt for analyzing one article.
pub fn analysis_prompt(content: &str) -> String {
    format!("Analyze the writing style of this article:\n\n{}", content)
}

/// Prompt for the synthesizer: every analysis, labeled by index and URL.
pub fn build_synthesis_prompt(analyses: &[SuccessfulAnalysis<'_>]) -> String {
    let analyses_text = analyses
        .iter()
        .enumerate()
        .map(|(i, a)| format!("Article {} ({}):\n{}", i + 1, a.url, a.style_analysis))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Here are the individual writing style analyses:\n\n{}\n\nProvide a synthesized description of the author's overall writing style.",
        analyses_text
    )
}

/// Synthesize an author style from the successful analyses.
///
/// With no analyses the model is not called and the placeholder text is
/// returned. Model failures propagate.
pub async fn synthesize(agent: &Agent, analyses: &[SuccessfulAnalysis<'_>]) -> Result<String> {
    if analyses.is_empty() {
        return Ok(NO_SYNTHESIS_PLACEHOLDER.to_string());
    }

    info!("Synthesizing writing style from all analyses...");
    let prompt = build_synthesis_prompt(analyses);
    agent.run(&prompt).await
}
