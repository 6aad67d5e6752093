//! Client error types.

use std::collections::HashMap;

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed (network, timeout, body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server rejected the request as unauthenticated (HTTP 401).
    ///
    /// Outside of a login call this is a session-invalidation signal:
    /// the caller is expected to force a logout.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message from server.
        message: String,
    },

    /// Server rejected the request as forbidden (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message from server.
        message: String,
    },

    /// Server rejected the request body (HTTP 400) with per-field errors.
    #[error("Validation failed ({} field(s))", fields.len())]
    Validation {
        /// Field name to message.
        fields: HashMap<String, String>,
    },

    /// Any other non-2xx response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Uniqueness-constraint markers the backend embeds in 403 messages,
/// mapped to the form field they belong to.
const CONSTRAINT_MARKERS: &[(&str, &str, &str)] = &[
    ("users_username_key", "username", "username already exists"),
    ("users_email_key", "email", "email already exists"),
    ("taxpayers_ci_key", "ci", "identity document already registered"),
];

impl Error {
    /// Check if this is an authorization failure (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized { .. })
    }

    /// Check if this is a permission failure (HTTP 403).
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Forbidden { .. })
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// Translate a 403 constraint-violation message into field errors.
    ///
    /// The backend reports duplicate username/email/identity-document as a
    /// 403 whose message names the violated database constraint. Returns
    /// an empty map for anything else, so callers can fall back to
    /// generic handling.
    pub fn constraint_violations(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        if let Error::Forbidden { message } = self {
            if message.contains("constraint") {
                for (marker, field, text) in CONSTRAINT_MARKERS {
                    if message.contains(marker) {
                        fields.insert((*field).to_string(), (*text).to_string());
                    }
                }
            }
        }
        fields
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error response body from the server.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_username() {
        let err = Error::Forbidden {
            message: "could not execute statement; constraint [users_username_key]".to_string(),
        };
        let fields = err.constraint_violations();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("username"));
    }

    #[test]
    fn test_constraint_violation_both() {
        let err = Error::Forbidden {
            message: "constraint [users_username_key]; constraint [users_email_key]".to_string(),
        };
        let fields = err.constraint_violations();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_plain_forbidden_has_no_fields() {
        let err = Error::Forbidden {
            message: "access denied".to_string(),
        };
        assert!(err.constraint_violations().is_empty());
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_unauthorized_is_not_forbidden() {
        let err = Error::Unauthorized {
            message: "bad token".to_string(),
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_forbidden());
        assert!(err.constraint_violations().is_empty());
    }
}
