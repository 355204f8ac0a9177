//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Styleprint - describe an author's writing voice from their articles
///
/// Fetches each article, asks a model to describe its writing style, then
/// asks a second agent to synthesize the author's overall voice.
///
/// Examples:
///   styleprint https://example.com/post-1.md https://example.com/post-2.md
///   styleprint --urls-file posts.txt --show-analyses
///   styleprint --urls-file posts.txt --format json --output style.json
///   styleprint --urls-file posts.txt --dry-run
///   styleprint --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Article URLs to analyze
    ///
    /// When none are given, URLs come from --urls-file or the
    /// [articles] section of the config file.
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// File with one article URL per line ('#' starts a comment)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub urls_file: Option<PathBuf>,

    /// Model for both agents
    ///
    /// Can also be set via STYLEPRINT_MODEL or .styleprint.toml.
    #[arg(short, long, env = "STYLEPRINT_MODEL")]
    pub model: Option<String>,

    /// Model for the synthesis agent only
    #[arg(long, value_name = "MODEL")]
    pub synthesizer_model: Option<String>,

    /// Anthropic API base URL
    #[arg(long, env = "ANTHROPIC_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Per-article fetch timeout in seconds (default: 30)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Model request timeout in seconds (default: 300)
    #[arg(long, value_name = "SECS")]
    pub model_timeout: Option<u64>,

    /// Maximum tokens per model response
    #[arg(long, value_name = "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature for model responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .styleprint.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (no progress bar, errors only in logs)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Also write the report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Include each article's individual analysis in the text report
    #[arg(long)]
    pub show_analyses: bool,

    /// Dry run: fetch the articles without calling any model
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .styleprint.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        for url in &self.urls {
            validate_article_url(url)?;
        }

        if let Some(ref api_url) = self.api_url {
            if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) || self.model_timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.max_tokens == Some(0) {
            return Err("Max tokens must be at least 1".to_string());
        }

        if let Some(ref path) = self.urls_file {
            if !path.is_file() {
                return Err(format!("URL list file does not exist: {}", path.display()));
            }
        }

        Ok(())
    }

    /// URLs given on the command line: positional ones first, then the
    /// contents of --urls-file.
    pub fn cli_urls(&self) -> Result<Vec<String>> {
        let mut urls = self.urls.clone();
        if let Some(ref path) = self.urls_file {
            urls.extend(crate::config::read_url_list(path)?);
        }
        Ok(urls)
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Article URLs must be absolute http(s) URLs.
pub fn validate_article_url(url: &str) -> Result<(), String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(format!(
            "Article URL must start with 'http://' or 'https://': {}",
            url
        ))
    }
}
