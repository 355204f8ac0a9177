//! Shared helpers for unit tests: a tiny HTTP responder and scripted
//! implementations of the fetch and model seams.

use crate::agent::llm::{CompletionRequest, LanguageModel, LlmError};
use crate::fetcher::{ArticleSource, FetchError};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What the test server does for a given path.
pub enum Reply {
    Respond {
        status: u16,
        content_type: &'static str,
        body: String,
    },
    /// Accept the request and never answer.
    Hang,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Respond {
            status: 200,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }

    pub fn json(status: u16, body: &str) -> Self {
        Reply::Respond {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Reply::Respond {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }
}

/// Start an HTTP/1.1 server on a random local port, routing by request
/// path. Returns the base URL (`http://127.0.0.1:PORT`).
pub async fn spawn_server(routes: fn(&str) -> Reply) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request_bytes = Vec::new();
                let mut chunk = [0u8; 8192];
                let mut expected: Option<usize> = None;
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        return;
                    }
                    request_bytes.extend_from_slice(&chunk[..n]);
                    if expected.is_none() {
                        if let Some(end) = request_bytes.windows(4).position(|w| w == b"\r\n\r\n") {
                            let head = String::from_utf8_lossy(&request_bytes[..end]).to_lowercase();
                            let body_len = head
                                .lines()
                                .find_map(|l| l.strip_prefix("content-length:"))
                                .and_then(|v| v.trim().parse::<usize>().ok())
                                .unwrap_or(0);
                            expected = Some(end + 4 + body_len);
                        }
                    }
                    // Drain the body too: closing with unread input resets the connection
                    if expected.is_some_and(|total| request_bytes.len() >= total) {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&request_bytes).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                match routes(&path) {
                    Reply::Hang => {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    }
                    Reply::Respond {
                        status,
                        content_type,
                        body,
                    } => {
                        let reason = StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");
                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason,
                            content_type,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                }
            });
        }
    });

    format!("http://{}", addr)
}

/// In-memory article source. Unknown URLs fail with a 404 status.
#[derive(Default)]
pub struct FakeSource {
    articles: HashMap<String, Result<String, FailureKind>>,
    fetches: AtomicUsize,
}

#[derive(Clone, Copy)]
pub enum FailureKind {
    NotFound,
    Timeout,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_article(mut self, url: &str, body: &str) -> Self {
        self.articles.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_failure(mut self, url: &str, kind: FailureKind) -> Self {
        self.articles.insert(url.to_string(), Err(kind));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleSource for FakeSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.articles.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(FailureKind::Timeout)) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout: Duration::from_secs(30),
            }),
            Some(Err(FailureKind::NotFound)) | None => Err(FetchError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

/// Model double that records every request.
///
/// Replies with `"<agent>: <last prompt line>"`. Prompts containing
/// `MODEL_FAILS` produce an API error; prompts containing `MODEL_SILENT`
/// produce an empty reply.
#[derive(Default)]
pub struct ScriptedModel {
    requests: Mutex<Vec<CompletionRequest>>,
    fail_agent: Option<String>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request from the named agent fails.
    pub fn failing_for(agent: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_agent: Some(agent.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, agent: &str) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.agent == agent)
            .collect()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if self.fail_agent.as_deref() == Some(request.agent.as_str())
            || request.prompt.contains("MODEL_FAILS")
        {
            return Err(LlmError::Api {
                status: 529,
                message: "Overloaded".to_string(),
            });
        }
        if request.prompt.contains("MODEL_SILENT") {
            return Ok(String::new());
        }

        let last_line = request.prompt.lines().last().unwrap_or_default();
        Ok(format!("{}: {}", request.agent, last_line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_routes(path: &str) -> Reply {
        match path {
            "/upload" => Reply::ok("received"),
            _ => Reply::status(404, "Not Found"),
        }
    }

    #[tokio::test]
    async fn test_server_reads_large_request_bodies() {
        let base = spawn_server(echo_routes).await;
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let body = "x".repeat(512 * 1024);

        let response = client
            .post(format!("{}/upload", base))
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "received");
    }
}
