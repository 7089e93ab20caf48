// Outbound HTTP boundary
// Every platform fetch goes through HttpTransport so tests can run offline

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::utils::config::{API_USER_AGENT, BROWSER_USER_AGENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A single outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// GET against a JSON API
    pub fn api(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: vec![
                ("User-Agent".to_string(), API_USER_AGENT.to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body: None,
            timeout,
        }
    }

    /// GET against an HTML profile page with a browser user agent
    pub fn page(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: vec![
                ("User-Agent".to_string(), BROWSER_USER_AGENT.to_string()),
                (
                    "Accept".to_string(),
                    "text/html,application/xhtml+xml".to_string(),
                ),
                ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
            ],
            body: None,
            timeout,
        }
    }

    /// POST a JSON body (GraphQL endpoints)
    pub fn post_json(url: impl Into<String>, body: &Value, timeout: Duration) -> Self {
        let mut request = Self::api(url, timeout);
        request.method = HttpMethod::Post;
        request
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        request.body = Some(body.to_string());
        request
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Parse the body as JSON, `None` when it is not JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("request to {0} timed out")]
    Timeout(String),

    #[error("no mock response registered for {method} {url}")]
    NoMockResponse { method: String, url: String },
}

/// Transport boundary for all HTTP I/O
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Real transport backed by reqwest
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = request.url.clone();
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        }
        .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| classify(&url, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(&url, e))?;

        Ok(HttpResponse { status, body })
    }
}

fn classify(url: &str, err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(url.to_string())
    } else {
        HttpError::Transport(err.to_string())
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
pub use mock::MockTransport;

#[cfg(test)]
mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    /// In-memory transport, no sockets.
    ///
    /// Responses are keyed by exact URL and served FIFO; unmatched URLs get the
    /// fallback response when one is set, otherwise `NoMockResponse`.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        inner: Arc<Mutex<Inner>>,
    }

    #[derive(Default)]
    struct Inner {
        routes: HashMap<String, VecDeque<HttpResponse>>,
        fallback: Option<HttpResponse>,
        requests: Vec<HttpRequest>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every unregistered URL answers with `response`
        pub fn with_fallback(response: HttpResponse) -> Self {
            let mock = Self::default();
            mock.inner.lock().expect("mock lock").fallback = Some(response);
            mock
        }

        pub fn push(&self, url: impl Into<String>, response: HttpResponse) {
            self.inner
                .lock()
                .expect("mock lock")
                .routes
                .entry(url.into())
                .or_default()
                .push_back(response);
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.inner.lock().expect("mock lock").requests.clone()
        }

        pub fn urls(&self) -> Vec<String> {
            self.requests().into_iter().map(|r| r.url).collect()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut inner = self.inner.lock().expect("mock lock");
            let url = request.url.clone();
            let method = request.method;
            inner.requests.push(request);

            if let Some(resp) = inner.routes.get_mut(&url).and_then(|q| q.pop_front()) {
                return Ok(resp);
            }
            match &inner.fallback {
                Some(resp) => Ok(resp.clone()),
                None => Err(HttpError::NoMockResponse {
                    method: method.as_str().to_string(),
                    url,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_uses_browser_agent() {
        let req = HttpRequest::page("https://example.com", Duration::from_secs(15));
        let ua = req
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("user-agent"))
            .map(|(_, v)| v.as_str());
        assert_eq!(ua, Some(BROWSER_USER_AGENT));
        assert_eq!(req.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_post_json_sets_body() {
        let req = HttpRequest::post_json(
            "https://example.com/graphql",
            &serde_json::json!({ "query": "{ a }" }),
            Duration::from_secs(10),
        );
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body.as_deref(), Some(r#"{"query":"{ a }"}"#));
    }

    #[tokio::test]
    async fn test_mock_serves_fifo_then_fallback() {
        let mock = MockTransport::with_fallback(HttpResponse::new(404, ""));
        mock.push("https://a", HttpResponse::new(200, "first"));

        let timeout = Duration::from_secs(1);
        let first = mock.send(HttpRequest::api("https://a", timeout)).await.unwrap();
        let second = mock.send(HttpRequest::api("https://a", timeout)).await.unwrap();

        assert_eq!(first.body, "first");
        assert_eq!(second.status, 404);
        assert_eq!(mock.urls().len(), 2);
    }
}
