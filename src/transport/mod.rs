//! Sending visits and the response shape the engine consumes.

mod http;

pub use http::{visit_headers, HttpTransport};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use thiserror::Error;

use crate::page::Page;
use crate::visit::VisitParams;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid visit URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to '{url}' timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// A received network response.
///
/// Protocol responses carry the page as a JSON object; anything else keeps
/// its body as a string.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Builder-style header insertion; invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_bytes()),
            reqwest::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Body as display text.
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Sends a visit and returns the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, params: &VisitParams, current: &Page) -> Result<HttpResponse, TransportError>;
}
