//! CSRF token extraction from a browser-style cookie header.

use std::fmt;

use crate::error::StorefrontError;

/// Header carrying the token on state-changing requests
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// A per-session CSRF token. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read the token named `cookie_name` out of a `Cookie` header value.
    pub fn from_cookie_header(header: &str, cookie_name: &str) -> Result<Self, StorefrontError> {
        cookie_value(header, cookie_name)
            .map(Self)
            .ok_or_else(|| StorefrontError::MissingCsrfCookie(cookie_name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(***)")
    }
}

/// Find a cookie by name in a `name=value; name2=value2` string.
///
/// The first match wins. Values are percent-decoded; a value that does not
/// decode to UTF-8 is returned raw.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    if header.is_empty() || name.is_empty() {
        return None;
    }

    header.split(';').map(str::trim).find_map(|cookie| {
        let raw = cookie.strip_prefix(name)?.strip_prefix('=')?;
        Some(
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string()),
        )
    })
}
