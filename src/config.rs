//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.styleprint.toml` files.

use crate::agent::{DEFAULT_API_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::fetcher::{FetchSettings, DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".styleprint.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Article fetching settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Articles to analyze when none are given on the command line.
    #[serde(default)]
    pub articles: ArticlesConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Article fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-article request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with article requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    /// Settings for building an HTTP fetcher.
    pub fn settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Anthropic API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model used for per-article analysis.
    #[serde(default = "default_model")]
    pub analyzer_model: String,

    /// Model used for the synthesis step.
    #[serde(default = "default_model")]
    pub synthesizer_model: String,

    /// Maximum tokens in each response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature. The API default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Model request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            analyzer_model: default_model(),
            synthesizer_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout_seconds: default_model_timeout(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_model_timeout() -> u64 {
    300
}

/// Article list settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticlesConfig {
    /// Article URLs, analyzed in this order.
    #[serde(default)]
    pub urls: Vec<String>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.styleprint.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // --model sets both agents; --synthesizer-model then overrides the second
        if let Some(ref model) = args.model {
            self.model.analyzer_model = model.clone();
            self.model.synthesizer_model = model.clone();
        }
        if let Some(ref model) = args.synthesizer_model {
            self.model.synthesizer_model = model.clone();
        }
        if let Some(ref api_url) = args.api_url {
            self.model.api_url = api_url.clone();
        }
        if let Some(max_tokens) = args.max_tokens {
            self.model.max_tokens = max_tokens;
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = Some(temperature);
        }
        if let Some(timeout) = args.model_timeout {
            self.model.timeout_seconds = timeout;
        }

        if let Some(timeout) = args.timeout {
            self.fetch.timeout_seconds = timeout;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Replace the configured article list when the CLI supplied one.
    pub fn merge_urls(&mut self, cli_urls: Vec<String>) {
        if !cli_urls.is_empty() {
            self.articles.urls = cli_urls;
        }
    }

    /// Check values that may have come from the config file.
    ///
    /// Applies the same limits as the command-line validation, so a bad
    /// `.styleprint.toml` fails before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_seconds == 0 {
            bail!("[fetch] timeout_seconds must be at least 1");
        }
        if self.model.timeout_seconds == 0 {
            bail!("[model] timeout_seconds must be at least 1");
        }
        if self.model.max_tokens == 0 {
            bail!("[model] max_tokens must be at least 1");
        }
        if let Some(temperature) = self.model.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                bail!("[model] temperature must be between 0.0 and 1.0");
            }
        }
        if !self.model.api_url.starts_with("http://") && !self.model.api_url.starts_with("https://")
        {
            bail!("[model] api_url must start with 'http://' or 'https://'");
        }
        for url in &self.articles.urls {
            crate::cli::validate_article_url(url).map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Read a list of URLs from a file: one per line, blank lines and `#`
/// comments ignored.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list: {}", path.display()))?;

    Ok(parse_url_list(&content))
}

fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
