//! Article fetching over HTTP.
//!
//! Articles are fetched with a single GET and a fixed per-request timeout.
//! There are no retries and no caching; redirects follow reqwest's defaults.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default timeout for a single article fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent sent with article requests unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = concat!("styleprint/", env!("CARGO_PKG_VERSION"));

/// Reasons a fetch can fail.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} failed: {error}")]
    Transport { url: String, error: reqwest::Error },
}

/// Something that can turn a URL into article text.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

/// Fetches articles with reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher with its own HTTP client.
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::from_client(client, settings.timeout))
    }

    /// Wrap an already configured client. `timeout` is only used for
    /// error messages; the client's own timeout is what applies.
    pub fn from_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                error: err,
            }
        }
    }
}

#[async_trait]
impl ArticleSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|e| self.classify(url, e))?;
        debug!("Fetched {} ({} bytes)", url, body.len());

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_server, Reply};

    fn fetcher(timeout: Duration) -> HttpFetcher {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap();
        HttpFetcher::from_client(client, timeout)
    }

    fn routes(path: &str) -> Reply {
        match path {
            "/article.md" => Reply::ok("# Title\n\nSome article text."),
            "/broken" => Reply::status(500, "Internal Server Error"),
            "/slow" => Reply::Hang,
            _ => Reply::status(404, "Not Found"),
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = spawn_server(routes).await;
        let body = tokio_test::assert_ok!(
            fetcher(Duration::from_secs(5))
                .fetch(&format!("{}/article.md", base))
                .await
        );

        assert_eq!(body, "# Title\n\nSome article text.");
    }

    #[tokio::test]
    async fn test_fetch_client_error_status() {
        let base = spawn_server(routes).await;
        let url = format!("{}/missing", base);
        let err = fetcher(Duration::from_secs(5)).fetch(&url).await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::Status { status, .. } if status == StatusCode::NOT_FOUND
        ));
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains(&url));
    }

    #[tokio::test]
    async fn test_fetch_server_error_status() {
        let base = spawn_server(routes).await;
        let err = fetcher(Duration::from_secs(5))
            .fetch(&format!("{}/broken", base))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status, .. } if status.is_server_error()));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let base = spawn_server(routes).await;
        let err = fetcher(Duration::from_millis(200))
            .fetch(&format!("{}/slow", base))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher(Duration::from_secs(5))
            .fetch(&format!("http://{}/article.md", addr))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[test]
    fn test_default_settings_come_from_config() {
        let settings = crate::config::FetchConfig::default().settings();
        assert_eq!(settings.timeout, DEFAULT_FETCH_TIMEOUT);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
        assert!(settings.user_agent.starts_with("styleprint/"));
    }
}
