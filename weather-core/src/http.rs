//! Transport seam between the weather client and the network.

use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

/// A GET request with query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { url: url.into(), query: Vec::new() }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The request never produced an HTTP status (timeout, DNS, reset, ...).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::new(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let res = self
            .http
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::new(format!("connection failed: {e}"))
                } else {
                    TransportError::new(format!("request failed: {e}"))
                }
            })?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}
