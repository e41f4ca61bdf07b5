use thiserror::Error;

/// Setup-time failures: configuration, credentials, client construction.
///
/// Per-request failures are [`crate::transport::TransportError`] and are
/// surfaced to the user through the view, not returned as errors.
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSRF cookie '{0}' not found in cookie header")]
    MissingCsrfCookie(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to render template: {0}")]
    Template(#[from] askama::Error),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
