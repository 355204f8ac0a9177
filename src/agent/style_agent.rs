//! Configured style agents.
//!
//! An agent pairs fixed instructions and a model identifier with a
//! [`LanguageModel`] backend. Two are used: the per-article analyzer and
//! the cross-article synthesizer.

use crate::agent::llm::{CompletionRequest, LanguageModel};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::debug;

/// Default model for both agents.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Default response budget per request.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

pub const ANALYZER_NAME: &str = "Article Style Analyzer";
pub const SYNTHESIZER_NAME: &str = "Writing Style Synthesizer";

const ANALYZER_INSTRUCTIONS: &str = r#"You are an expert at analyzing writing style for technical articles.

Be concise but specific. Provide a clear, actionable description of the writing style in 2-4 paragraphs maximum.

Focus on what makes this writing distinctive and memorable."#;

const SYNTHESIZER_INSTRUCTIONS: &str = r#"You are an expert at identifying patterns in writing style across multiple pieces of content.

When given analyses from multiple articles by the same author, your task is to:

1. Identify patterns that appear across MULTIPLE articles (not just one)
2. Highlight the most distinctive and consistent characteristics
3. Determine what truly stands out as unique to this author
4. Define the core elements of their voice and approach

Do NOT simply summarize each individual analysis. Instead, identify the common threads and most salient features that define this author's style across their body of work.

Provide a concise, synthesized description of the author's writing style (3-5 paragraphs maximum). Focus on what consistently stands out and makes their voice unique."#;

const MARKDOWN_INSTRUCTION: &str = "Use markdown to format your answers.";

/// Immutable configuration of one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Ask the model to answer in markdown.
    pub markdown: bool,
}

impl AgentConfig {
    /// The per-article style analyzer.
    pub fn article_analyzer(model: &str) -> Self {
        Self {
            name: ANALYZER_NAME.to_string(),
            instructions: ANALYZER_INSTRUCTIONS.to_string(),
            model: model.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            markdown: false,
        }
    }

    /// The cross-article synthesizer.
    pub fn style_synthesizer(model: &str) -> Self {
        Self {
            name: SYNTHESIZER_NAME.to_string(),
            instructions: SYNTHESIZER_INSTRUCTIONS.to_string(),
            model: model.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            markdown: true,
        }
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: Option<f32>) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// System prompt sent with every request.
    pub fn system_prompt(&self) -> String {
        if self.markdown {
            format!("{}\n\n{}", self.instructions, MARKDOWN_INSTRUCTION)
        } else {
            self.instructions.clone()
        }
    }
}

/// An agent bound to a model backend.
#[derive(Clone)]
pub struct Agent {
    config: AgentConfig,
    model: Arc<dyn LanguageModel>,
}

impl Agent {
    pub fn new(config: AgentConfig, model: Arc<dyn LanguageModel>) -> Self {
        Self { config, model }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Send `prompt` and return the model's answer.
    ///
    /// Blank answers are errors.
    pub async fn run(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest {
            agent: self.config.name.clone(),
            model: self.config.model.clone(),
            system: self.config.system_prompt(),
            prompt: prompt.to_string(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let content = self
            .model
            .complete(&request)
            .await
            .with_context(|| format!("{} request failed", self.config.name))?;

        if content.trim().is_empty() {
            bail!("{} returned an empty response", self.config.name);
        }

        debug!("{} answered with {} bytes", self.config.name, content.len());
        Ok(content)
    }
}
