//! HTTP transport abstraction
//!
//! The pipeline only needs "send a request, get a status and body back".
//! [`HttpTransport`] does that over a blocking `reqwest` client;
//! [`MockTransport`] records requests and replays queued responses so the
//! pipeline can be tested without network access.
//!
//! # Example
//!
//! ```
//! use kraken_rest::transport::{HttpRequest, Method, MockTransport, Transport};
//!
//! let transport = MockTransport::new();
//! transport.push_response(200, r#"{"error":[],"result":{}}"#);
//!
//! let request = HttpRequest::new(Method::Get, "https://api.kraken.com/0/public/Time");
//! let response = transport.send(&request).unwrap();
//! assert_eq!(response.status, 200);
//! assert_eq!(transport.requests().len(), 1);
//! ```

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Content type of form-encoded bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// `POST` and `PATCH` carry a form body; `GET` and `DELETE` only query and headers
    pub fn carries_body(&self) -> bool {
        matches!(self, Self::Post | Self::Patch)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Full URL including the query string
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Form-encoded body, only for methods that carry one
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received HTTP response
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
}

/// Transport layer errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP client could not be built
    #[error("client build failed: {0}")]
    Build(String),

    /// The request failed, possibly after a response was received
    #[error("request failed: {message}")]
    Request {
        message: String,
        response: Option<HttpResponse>,
    },

    /// A mock transport ran out of queued responses
    #[error("no queued response for {0}")]
    Exhausted(String),
}

impl TransportError {
    /// The response the transport managed to receive before failing, if any
    pub fn into_response(self) -> Result<HttpResponse, Self> {
        match self {
            Self::Request {
                response: Some(response),
                ..
            } => Ok(response),
            other => Err(other),
        }
    }
}

/// Trait for HTTP transport abstraction
///
/// This trait enables testing of the request pipeline by allowing mock
/// implementations to be injected instead of a real HTTP client.
pub trait Transport: Send + Sync {
    /// Perform one request
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Blocking HTTP transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(skip_all, fields(method = %request.method))]
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method.carries_body() {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(request.body.clone().unwrap_or_default());
        }

        let response = builder.send().map_err(|e| TransportError::Request {
            message: e.to_string(),
            response: None,
        })?;

        let status = response.status().as_u16();
        debug!(status, "Received response");

        // A failed body read carries no response
        let body = response.text().map_err(|e| TransportError::Request {
            message: format!("reading {} response body: {}", status, e),
            response: None,
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Mock transport for testing
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Responses returned by send(), in order
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    /// Requests captured by send()
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.responses
            .lock()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Exhausted(request.url.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_body() {
        assert!(Method::Post.carries_body());
        assert!(Method::Patch.carries_body());
        assert!(!Method::Get.carries_body());
        assert!(!Method::Delete.carries_body());
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut request = HttpRequest::new(Method::Get, "https://example.test");
        request.headers.push(("API-Key".into(), "abc".into()));
        assert_eq!(request.header("api-key"), Some("abc"));
        assert_eq!(request.header("API-Sign"), None);
    }

    #[test]
    fn test_error_response_is_recovered() {
        let err = TransportError::Request {
            message: "body read failed".into(),
            response: Some(HttpResponse::new(502, "")),
        };
        assert_eq!(err.into_response().unwrap().status, 502);

        let err = TransportError::Request {
            message: "dns".into(),
            response: None,
        };
        assert!(err.into_response().is_err());
    }

    #[test]
    fn test_mock_replays_in_order() {
        let transport = MockTransport::new();
        transport.push_response(200, "first");
        transport.push_response(500, "second");

        let request = HttpRequest::new(Method::Get, "https://example.test");
        assert_eq!(transport.send(&request).unwrap().body, "first");
        assert_eq!(transport.send(&request).unwrap().status, 500);
        assert!(matches!(
            transport.send(&request),
            Err(TransportError::Exhausted(_))
        ));
        assert_eq!(transport.requests().len(), 3);
    }
}
