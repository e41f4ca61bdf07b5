//! HTTP transport with CSRF token injection.

use std::future::Future;

use reqwest::header::{ACCEPT, COOKIE};

use crate::config::ClientConfig;
use crate::csrf::{CsrfToken, CSRF_HEADER};
use crate::domain::ResponseEnvelope;
use crate::error::StorefrontError;

/// Header jQuery adds to same-origin AJAX calls; Django's `is_ajax` keyed off it.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

/// A form-encoded POST to a storefront endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl PostRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            form: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }
}

/// Per-request failures. These end the user action; nothing retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Network(String),
    Timeout,
    Status { status: u16, body: String },
    Decode(String),
    InvalidUrl(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Network(err) => write!(f, "Network error: {}", err),
            TransportError::Timeout => write!(f, "Request timed out"),
            TransportError::Status { status, body } => {
                write!(f, "Server responded with HTTP {}: {}", status, body)
            }
            TransportError::Decode(err) => write!(f, "Invalid response body: {}", err),
            TransportError::InvalidUrl(err) => write!(f, "Invalid request URL: {}", err),
        }
    }
}

impl std::error::Error for TransportError {}

impl TransportError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::InvalidUrl(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }

    /// Text shown in the blocking alert.
    pub fn alert_text(&self) -> String {
        match self {
            TransportError::Status { status, body } if body.trim().is_empty() => {
                format!("Request failed (HTTP {})", status)
            }
            TransportError::Status { status, body } => {
                format!("Request failed (HTTP {}): {}", status, body.trim())
            }
            other => other.to_string(),
        }
    }
}

/// Sends a POST and decodes the JSON envelope.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        request: PostRequest,
    ) -> impl Future<Output = Result<ResponseEnvelope, TransportError>> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn post(
        &self,
        request: PostRequest,
    ) -> impl Future<Output = Result<ResponseEnvelope, TransportError>> + Send {
        (**self).post(request)
    }
}

/// `reqwest`-backed transport that stamps every request with the CSRF token.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    csrf: CsrfToken,
    cookie_header: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, csrf: CsrfToken) -> Result<Self, StorefrontError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            csrf,
            cookie_header: None,
        })
    }

    /// Build from the page's cookie header: the token is read out of it and
    /// the header itself is forwarded so the server can match the two.
    pub fn from_cookie_header(
        config: &ClientConfig,
        cookie_header: &str,
    ) -> Result<Self, StorefrontError> {
        let csrf = CsrfToken::from_cookie_header(cookie_header, &config.csrf_cookie_name)?;
        Ok(Self::new(config, csrf)?.with_cookie_header(cookie_header))
    }

    pub fn with_cookie_header(mut self, cookie_header: impl Into<String>) -> Self {
        self.cookie_header = Some(cookie_header.into());
        self
    }
}

impl Transport for HttpTransport {
    async fn post(&self, request: PostRequest) -> Result<ResponseEnvelope, TransportError> {
        tracing::debug!("POST {} ({} form fields)", request.url, request.form.len());

        let mut builder = self
            .client
            .post(&request.url)
            .header(CSRF_HEADER, self.csrf.as_str())
            .header(REQUESTED_WITH_HEADER, "XMLHttpRequest")
            .header(ACCEPT, "application/json");
        if let Some(cookie) = &self.cookie_header {
            builder = builder.header(COOKIE, cookie);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await.map_err(TransportError::from_reqwest)?;
        let status = response.status();
        let body = response.text().await.map_err(TransportError::from_reqwest)?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
