use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config;

/// Transport or provider-side failure of a completion request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("Cannot connect to completion provider at {0}")]
    Connection(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP client error: {0}")]
    Http(String),
    #[error("Provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse provider response: {0}")]
    ResponseParsing(String),
    #[error("Provider returned no message content")]
    EmptyResponse,
}

/// Text completion over a system instruction and user content.
///
/// One attempt per call. Implementations never retry.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, system: &str, user: &str, api_key: &str) -> Result<String, CompletionError>;
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiClient {
    /// Must be called outside an async context (blocking client).
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, CompletionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from /chat/completions
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, system: &str, user: &str, api_key: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: config::MODEL,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: config::TEMPERATURE,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    CompletionError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    CompletionError::Timeout(self.timeout_secs)
                } else {
                    CompletionError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| CompletionError::ResponseParsing(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}

/// Mock completion client: returns a configured outcome and records every call.
pub struct MockCompletionClient {
    outcome: Result<String, CompletionError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, String)>>,
    delay: Option<Duration>,
}

impl MockCompletionClient {
    pub fn new(response: &str) -> Self {
        Self {
            outcome: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            delay: None,
        }
    }

    pub fn failing(error: CompletionError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            delay: None,
        }
    }

    /// Block every call for `delay` before answering, like a slow provider.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (system, user) of the most recent call.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().ok().and_then(|g| g.clone())
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(&self, system: &str, user: &str, _api_key: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some((system.to_string(), user.to_string()));
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Serve `app` on an ephemeral port, returning its base URL.
    async fn spawn_provider(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    async fn complete_blocking(base_url: String) -> Result<String, CompletionError> {
        tokio::task::spawn_blocking(move || {
            let client = OpenAiClient::new(&base_url, 5).unwrap();
            client.complete("system text", "user text", "sk-test")
        })
        .await
        .unwrap()
    }

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockCompletionClient::new("ok");
        assert_eq!(client.complete("s", "u", "k").unwrap(), "ok");
        assert_eq!(client.calls(), 1);
        assert_eq!(client.last_request(), Some(("s".into(), "u".into())));
    }

    #[test]
    fn mock_client_failure_is_returned_as_is() {
        let client = MockCompletionClient::failing(CompletionError::EmptyResponse);
        assert_eq!(client.complete("s", "u", "k"), Err(CompletionError::EmptyResponse));
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = OpenAiClient::new("https://api.openai.com/v1/", 60).unwrap();
        assert_eq!(client.base_url(), "https://api.openai.com/v1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sends_chat_request_and_returns_first_message() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], "gpt-4o-mini");
                assert_eq!(body["temperature"].as_f64().unwrap() as f32, 0.4);
                assert_eq!(body["stream"], false);
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][0]["content"], "system text");
                assert_eq!(body["messages"][1]["role"], "user");
                assert_eq!(body["messages"][1]["content"], "user text");
                Json(json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "first"}},
                        {"message": {"role": "assistant", "content": "second"}}
                    ]
                }))
            }),
        );
        let url = spawn_provider(app).await;
        assert_eq!(complete_blocking(url).await.unwrap(), "first");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn provider_error_status_is_surfaced() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let url = spawn_provider(app).await;
        let err = complete_blocking(url).await.unwrap_err();
        assert_eq!(
            err,
            CompletionError::Api {
                status: 401,
                body: "invalid api key".into()
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_choices_is_empty_response() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let url = spawn_provider(app).await;
        assert_eq!(complete_blocking(url).await, Err(CompletionError::EmptyResponse));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_body_is_parse_error() {
        let app = Router::new().route("/v1/chat/completions", post(|| async { "not json" }));
        let url = spawn_provider(app).await;
        assert!(matches!(
            complete_blocking(url).await,
            Err(CompletionError::ResponseParsing(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_provider_is_connection_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = complete_blocking(format!("http://{addr}/v1")).await.unwrap_err();
        assert!(matches!(err, CompletionError::Connection(_)), "{err:?}");
    }
}
