//! HTTP Transport
//!
//! The seam between the client components and the traceability backend.
//! Everything that talks to the backend goes through [`Transport`], so the
//! session store and blockchain client can be exercised without a network.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// HTTP method subset used by the backend API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Outgoing request, relative to the backend base URL
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub bearer_token: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            bearer_token: None,
        }
    }

    pub fn post<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, TransportError> {
        let body = serde_json::to_value(body).map_err(|e| TransportError::Encode(e.to_string()))?;
        Ok(Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
            bearer_token: None,
        })
    }

    /// Attach an `Authorization: Bearer` token
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }
}

/// Response status plus raw body
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Error body shapes the backend uses (`{"message": ..}` or `{"error": ..}`)
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_str(&self.body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Server-supplied error message, if the body carries one
    pub fn error_message(&self) -> Option<String> {
        let body: ErrorBody = serde_json::from_str(&self.body).ok()?;
        body.message.or(body.error).filter(|m| !m.trim().is_empty())
    }
}

/// Transport-level failures (no HTTP status was obtained, or the body was unusable)
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Sends requests to the backend
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.url(&request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(method = %request.method, url = %url, "Sending backend request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted transport for unit tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub enum Reply {
        Respond(u16, String),
        Fail(String),
    }

    /// Replies keyed by `"METHOD path"`; unknown routes answer 404.
    #[derive(Default)]
    pub struct MockTransport {
        replies: Mutex<HashMap<String, Reply>>,
        calls: Mutex<Vec<HttpRequest>>,
        latency: Option<std::time::Duration>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, method: Method, path: &str, status: u16, body: serde_json::Value) -> Self {
            self.set(method, path, Reply::Respond(status, body.to_string()));
            self
        }

        pub fn fail(self, method: Method, path: &str, message: &str) -> Self {
            self.set(method, path, Reply::Fail(message.to_string()));
            self
        }

        /// Every reply arrives after `latency` (use with paused time)
        pub fn with_latency(mut self, latency: std::time::Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        pub fn set(&self, method: Method, path: &str, reply: Reply) {
            self.replies
                .lock()
                .unwrap()
                .insert(format!("{} {}", method, path), reply);
        }

        pub fn calls(&self) -> Vec<HttpRequest> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let key = format!("{} {}", request.method, request.path);
            self.calls.lock().unwrap().push(request);

            let reply = self.replies.lock().unwrap().get(&key).cloned();
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            match reply {
                Some(Reply::Respond(status, body)) => Ok(HttpResponse::new(status, body)),
                Some(Reply::Fail(message)) => Err(TransportError::Network(message)),
                None => Ok(HttpResponse::new(404, r#"{"message":"not found"}"#)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message_field() {
        let response = HttpResponse::new(400, r#"{"message":"bad tag","error":"x"}"#);
        assert_eq!(response.error_message().as_deref(), Some("bad tag"));

        let response = HttpResponse::new(500, r#"{"error":"db down"}"#);
        assert_eq!(response.error_message().as_deref(), Some("db down"));

        let response = HttpResponse::new(502, "<html>Bad Gateway</html>");
        assert_eq!(response.error_message(), None);
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(201, "").is_success());
        assert!(HttpResponse::new(207, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn test_url_joining() {
        let transport =
            ReqwestTransport::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.url("/log-event"), "http://127.0.0.1:5000/log-event");
        assert_eq!(transport.url("api/x"), "http://127.0.0.1:5000/api/x");
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let mock = mock::MockTransport::new().respond(
            Method::Get,
            "/blockchain-status",
            200,
            serde_json::json!({"connected": true}),
        );

        let ok = mock.send(HttpRequest::get("/blockchain-status")).await.unwrap();
        assert_eq!(ok.status, 200);

        let missing = mock.send(HttpRequest::get("/nope")).await.unwrap();
        assert_eq!(missing.status, 404);
        assert_eq!(mock.call_count(), 2);
    }
}
