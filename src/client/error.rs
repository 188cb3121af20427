//! The single failure shape of every remote call.

use serde_json::Value;
use thiserror::Error;

/// A remote call that did not succeed.
///
/// `status` is `None` when no HTTP response was received at all.
/// `detail` is the human-readable message supplied by the server, if any.
/// Callers decide what to show based on `detail` alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.status, .detail, .cause))]
pub struct RequestFailure {
    /// HTTP status of the response, if one arrived.
    pub status: Option<u16>,
    /// Server-supplied message.
    pub detail: Option<String>,
    cause: Option<String>,
}

impl RequestFailure {
    /// A failure that came back as an HTTP error response.
    pub fn from_response(status: u16, body: Option<&Value>) -> Self {
        Self {
            status: Some(status),
            detail: body.and_then(extract_detail),
            cause: None,
        }
    }

    /// A failure with no usable HTTP response (connection, timeout, decode).
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            detail: None,
            cause: Some(cause.to_string()),
        }
    }

    /// A failure with a known status and server detail, mostly for tests.
    pub fn with_detail(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            detail: Some(detail.into()),
            cause: None,
        }
    }

    /// The server detail, or `fallback` when the server gave none.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.detail.as_deref().unwrap_or(fallback)
    }

    /// True for 401 responses.
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

fn describe(status: &Option<u16>, detail: &Option<String>, cause: &Option<String>) -> String {
    let status = status
        .map(|s| format!("status {}", s))
        .unwrap_or_else(|| "no response".to_string());
    match (detail, cause) {
        (Some(detail), _) => format!("request failed ({}): {}", status, detail),
        (None, Some(cause)) => format!("request failed ({}): {}", status, cause),
        (None, None) => format!("request failed ({})", status),
    }
}

/// Pulls a display message out of an error body.
///
/// Accepts `{"detail": "..."}` and the validation form
/// `{"detail": [{"msg": "...", ...}, ...]}`, taking the first message.
fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_detail() {
        let failure =
            RequestFailure::from_response(400, Some(&json!({"detail": "Already marked today"})));
        assert_eq!(failure.status, Some(400));
        assert_eq!(failure.detail.as_deref(), Some("Already marked today"));
        assert_eq!(failure.message_or("fallback"), "Already marked today");
    }

    #[test]
    fn test_validation_detail() {
        let body = json!({"detail": [{"loc": ["body", "email"], "msg": "field required"}]});
        let failure = RequestFailure::from_response(422, Some(&body));
        assert_eq!(failure.detail.as_deref(), Some("field required"));
    }

    #[test]
    fn test_missing_detail_uses_fallback() {
        let failure = RequestFailure::from_response(500, Some(&json!({"error": "boom"})));
        assert!(failure.detail.is_none());
        assert_eq!(failure.message_or("Invalid credentials"), "Invalid credentials");

        let failure = RequestFailure::transport("connection refused");
        assert_eq!(failure.status, None);
        assert_eq!(failure.message_or("Face not recognized"), "Face not recognized");
        assert!(failure.to_string().contains("connection refused"));
    }
}
