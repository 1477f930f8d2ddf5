use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use tokio::time::timeout;
use url::Url;

use super::{HttpResponse, Transport, TransportError};
use crate::config::{ProtocolConfig, TransportConfig};
use crate::page::url::href_to_url;
use crate::page::Page;
use crate::visit::{Method, VisitParams};

/// Visit transport over `reqwest`.
pub struct HttpTransport {
    client: Client,
    protocol: ProtocolConfig,
    base: Url,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(protocol: ProtocolConfig, config: &TransportConfig) -> Result<Self, TransportError> {
        let base = Url::parse(&config.base_url).map_err(|source| TransportError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            protocol,
            base,
            request_timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    fn target_url(&self, params: &VisitParams) -> Result<Url, TransportError> {
        let mut url = href_to_url(params.url(), &self.base).map_err(|source| {
            TransportError::InvalidUrl {
                url: params.url().to_string(),
                source,
            }
        })?;

        if params.method() == Method::Get && !params.payload().is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in params.payload() {
                match value {
                    Value::String(s) => query.append_pair(name, s),
                    other => query.append_pair(name, &other.to_string()),
                };
            }
        }
        Ok(url)
    }

    async fn do_send(&self, params: &VisitParams, current: &Page, url: Url) -> Result<HttpResponse, TransportError> {
        let method = match params.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let url_text = url.to_string();
        let mut builder = self
            .client
            .request(method, url)
            .headers(visit_headers(&self.protocol, params, current)?);

        if params.method() != Method::Get {
            builder = builder.json(params.payload());
        }

        let response = builder.send().await.map_err(|source| TransportError::Request {
            url: url_text.clone(),
            source,
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(|source| TransportError::Request {
            url: url_text.clone(),
            source,
        })?;

        let is_protocol = headers.contains_key(self.protocol.signature_header.as_str());
        let body = if is_protocol {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        } else {
            Value::String(text)
        };

        tracing::debug!(url = %url_text, status, is_protocol, "Visit response received");
        Ok(HttpResponse { status, headers, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, params: &VisitParams, current: &Page) -> Result<HttpResponse, TransportError> {
        let url = self.target_url(params)?;
        let url_text = url.to_string();
        match timeout(self.request_timeout, self.do_send(params, current, url)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                url: url_text,
                seconds: self.request_timeout.as_secs(),
            }),
        }
    }
}

/// Protocol headers for a visit made from `current`.
pub fn visit_headers(
    protocol: &ProtocolConfig,
    params: &VisitParams,
    current: &Page,
) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    let mut put = |name: &str, value: &str| -> Result<(), TransportError> {
        let invalid = || TransportError::InvalidHeader {
            name: name.to_string(),
        };
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(header, value);
        Ok(())
    };

    for (name, value) in params.headers() {
        put(name, value)?;
    }

    put(ACCEPT.as_str(), "text/html, application/xhtml+xml")?;
    put("X-Requested-With", "XMLHttpRequest")?;
    put(&protocol.signature_header, "true")?;

    if let Some(version) = &current.version {
        put(&protocol.version_header, version)?;
    }

    if params.is_partial() {
        put(&protocol.partial_component_header, &current.component)?;
        if !params.only_props().is_empty() {
            put(&protocol.partial_data_header, &params.only_props().join(","))?;
        }
        if !params.except_props().is_empty() {
            put(&protocol.partial_except_header, &params.except_props().join(","))?;
        }
    }

    if let Some(bag) = params.error_bag_name() {
        put(&protocol.error_bag_header, bag)?;
    }

    Ok(headers)
}
