//! The JSON envelope every storefront endpoint answers with.
//!
//! The server is loose about types: `success` is sometimes `true` and
//! sometimes a message such as `"Backup Completed successfully"`, and totals
//! may arrive as strings or numbers. Fields are kept as raw JSON and read
//! with JavaScript truthiness, which is what the page scripts relied on.

use serde::Deserialize;
use serde_json::Value;

use super::cart::CartTotals;

/// Response body of the cart, backup and restore endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    success: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(flatten)]
    pub totals: CartTotals,
}

impl ResponseEnvelope {
    /// Envelope with a boolean `success` and no other fields.
    pub fn success() -> Self {
        Self {
            success: Some(Value::Bool(true)),
            ..Self::default()
        }
    }

    /// Envelope whose `success` is a message string.
    pub fn success_with_message(message: impl Into<String>) -> Self {
        Self {
            success: Some(Value::String(message.into())),
            ..Self::default()
        }
    }

    /// Envelope carrying only an application error.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(Value::String(message.into())),
            ..Self::default()
        }
    }

    pub fn with_totals(mut self, totals: CartTotals) -> Self {
        self.totals = totals;
        self
    }

    /// Whether `success` is truthy.
    pub fn is_success(&self) -> bool {
        self.success.as_ref().is_some_and(is_truthy)
    }

    /// The success message, when the server sent one instead of `true`.
    pub fn success_message(&self) -> Option<&str> {
        match &self.success {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Text of a truthy `error` field.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().filter(|v| is_truthy(v)).map(js_text)
    }
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text a JSON value would show once written into the page.
pub fn js_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            // 90.0 displays as "90"
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
