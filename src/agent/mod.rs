//! LLM agent modules for style analysis.
//!
//! This module provides the model backend seam and the two configured
//! agents built on it.

pub mod llm;
pub mod style_agent;

pub use llm::{AnthropicClient, LanguageModel, DEFAULT_API_URL};
pub use style_agent::{Agent, AgentConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
