//! Language-model backend.
//!
//! The pipeline only sees the [`LanguageModel`] trait: text in, text out.
//! [`AnthropicClient`] implements it over the Anthropic Messages API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default Anthropic API base URL.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";

/// The Anthropic API version header value.
const API_VERSION: &str = "2023-06-01";

/// A single completion request issued by an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Name of the agent issuing the request (for logs).
    pub agent: String,
    pub model: String,
    /// System instructions.
    pub system: String,
    /// User prompt.
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// Errors from a model backend.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("cannot connect to model API at {url}")]
    Connect { url: String },

    #[error("model API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to send model request: {0}")]
    Request(String),

    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

/// A text-in, text-out model backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Messages API request body.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Messages API response body.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http_client: reqwest::Client,
    api_url: String,
    timeout_seconds: u64,
}

impl AnthropicClient {
    /// Create a client for `api_url` authenticated with `api_key`.
    pub fn new(api_url: &str, api_key: &str, timeout_seconds: u64) -> Result<Self> {
        let mut key = HeaderValue::from_str(api_key).context("API key is not a valid header value")?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::from_client(http_client, api_url, timeout_seconds))
    }

    /// Wrap a preconfigured client. Headers are expected to be set already.
    pub fn from_client(http_client: reqwest::Client, api_url: &str, timeout_seconds: u64) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout_seconds,
        }
    }

    /// Messages endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.api_url)
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = self.endpoint();
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };

        debug!(
            "Sending {} request to {} ({} prompt bytes)",
            request.agent,
            request.model,
            request.prompt.len()
        );

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        seconds: self.timeout_seconds,
                    }
                } else if e.is_connect() {
                    LlmError::Connect {
                        url: self.api_url.clone(),
                    }
                } else {
                    LlmError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(extract_text(parsed))
    }
}

/// Concatenate the text blocks of a response.
fn extract_text(response: MessagesResponse) -> String {
    response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("")
}

/// Pull the message out of an API error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
