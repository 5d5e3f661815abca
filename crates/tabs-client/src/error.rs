//! Error taxonomy for backend calls.

use std::fmt;

use serde_json::Value;

/// Categories of client errors for consistent handling at the edge.
///
/// An expired access token never surfaces as its own variant: the request
/// pipeline recovers it transparently via refresh, and an unrecovered 401
/// comes back as `Http { status: 401, .. }`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Client-side field check failed before any request was made.
    Validation(String),
    /// No refresh token is stored; the session cannot be recovered.
    Unauthenticated,
    /// Non-2xx response from the backend, surfaced to the caller.
    Http { status: u16, message: String },
    /// Connection failure or timeout. Never retried by the pipeline.
    Network(String),
    /// Response body could not be decoded.
    Parse(String),
    /// Credential persistence failed (read or write).
    Store(String),
}

impl ApiError {
    /// Builds an `Http` error from a response status and raw body.
    ///
    /// Pulls the backend's `detail`/`error` message out of a JSON body when
    /// one is present, falling back to the first field-error array (Django
    /// serializers report `{"field": ["msg", ...]}`).
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = extract_message(body)
            .map_or_else(|| format!("HTTP {status}"), |msg| format!("HTTP {status}: {msg}"));
        Self::Http { status, message }
    }

    /// Returns the HTTP status code, if this is an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extracts a human-readable message from a backend error body.
fn extract_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let obj = json.as_object()?;

    for key in ["detail", "error", "message"] {
        if let Some(msg) = obj.get(key).and_then(Value::as_str) {
            return Some(msg.to_string());
        }
    }

    // Field errors: {"category": ["Invalid choice."], ...}
    obj.iter().find_map(|(field, value)| {
        let first = value.as_array()?.first()?.as_str()?;
        Some(format!("{field}: {first}"))
    })
}

/// Maps a transport-level reqwest failure onto the taxonomy.
pub fn classify_reqwest_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Network(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ApiError::Network(format!("Connection failed: {e}"))
    } else if e.is_decode() {
        ApiError::Parse(format!("Failed to decode response: {e}"))
    } else {
        ApiError::Network(format!("Network error: {e}"))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "{msg}"),
            ApiError::Unauthenticated => write!(f, "Not signed in (no refresh token stored)"),
            ApiError::Http { message, .. } => write!(f, "{message}"),
            ApiError::Network(msg) | ApiError::Parse(msg) | ApiError::Store(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Result type for client operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: `detail` key wins over field errors.
    #[test]
    fn test_http_status_extracts_detail() {
        let err = ApiError::http_status(401, r#"{"detail":"No active account found"}"#);
        assert_eq!(
            err,
            ApiError::Http {
                status: 401,
                message: "HTTP 401: No active account found".to_string()
            }
        );
    }

    /// Test: field-error arrays are folded into the message.
    #[test]
    fn test_http_status_extracts_field_error() {
        let err = ApiError::http_status(400, r#"{"category":["Invalid choice."]}"#);
        let ApiError::Http { status, message } = err else {
            panic!("expected Http variant");
        };
        assert_eq!(status, 400);
        assert!(message.contains("category: Invalid choice."));
    }

    /// Test: non-JSON bodies fall back to the bare status.
    #[test]
    fn test_http_status_plain_body() {
        let err = ApiError::http_status(502, "<html>Bad Gateway</html>");
        assert_eq!(
            err,
            ApiError::Http {
                status: 502,
                message: "HTTP 502".to_string()
            }
        );
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(ApiError::http_status(404, "").status(), Some(404));
        assert_eq!(ApiError::Unauthenticated.status(), None);
    }
}
