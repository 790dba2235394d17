//! Error types for the request pipeline and the domain stores.

use questionnaire_core::StorageError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline calls.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure of a single pipeline call.
///
/// Every variant renders a human-readable message through `Display`:
/// the server's own message when it sent one, `server error (<status>)`
/// when it did not, `no response` when nothing came back, and the raw
/// error text when the request was never sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    // ═══════════════════════════════════════════════════════════
    // No response
    // ═══════════════════════════════════════════════════════════

    /// The transport gave up waiting. Eligible for one fallback retry.
    #[error("no response (timed out after {after_ms}ms)")]
    Timeout {
        /// Configured timeout that elapsed.
        after_ms: u64,
    },

    /// The request went out but no response arrived.
    #[error("no response")]
    Network {
        /// Transport error text, for logs.
        detail: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Response with an error status
    // ═══════════════════════════════════════════════════════════

    /// 401 or 403. The pipeline clears the session before returning this.
    #[error("{}", server_message(*.status, .message.as_deref()))]
    AuthRejected {
        /// HTTP status (401 or 403).
        status: u16,
        /// Message from the response body.
        message: Option<String>,
    },

    /// 409, e.g. a duplicate submission.
    #[error("{}", server_message(409, .message.as_deref()))]
    Conflict {
        /// Message from the response body.
        message: Option<String>,
    },

    /// Any other non-2xx status.
    #[error("{}", server_message(*.status, .message.as_deref()))]
    Server {
        /// HTTP status.
        status: u16,
        /// Message from the response body.
        message: Option<String>,
    },

    // ═══════════════════════════════════════════════════════════
    // Never sent / unreadable
    // ═══════════════════════════════════════════════════════════

    /// The request was never sent (bad descriptor, bad header value...).
    #[error("{0}")]
    Client(String),

    /// A 2xx body could not be decoded into the expected type.
    #[error("invalid response body: {0}")]
    Decode(String),
}

fn server_message(status: u16, message: Option<&str>) -> String {
    match message {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => format!("server error ({status})"),
    }
}

impl ApiError {
    /// Classify a non-2xx response.
    #[must_use]
    pub fn from_status(status: u16, body: &serde_json::Value) -> Self {
        let message = body_message(body);
        match status {
            401 | 403 => Self::AuthRejected { status, message },
            409 => Self::Conflict { message },
            _ => Self::Server { status, message },
        }
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AuthRejected { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Conflict { .. } => Some(409),
            Self::Timeout { .. } | Self::Network { .. } | Self::Client(_) | Self::Decode(_) => None,
        }
    }

    /// Returns `true` for a transport timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` for 401 and 403.
    #[must_use]
    pub const fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::AuthRejected { .. })
    }

    /// Timeout error for the given duration.
    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout {
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Reads `message`, then `error`, from an error body.
fn body_message(body: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(serde_json::Value::as_str))
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Failure of a domain store operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The questionnaire was already answered by this user (HTTP 409).
    #[error("already submitted")]
    AlreadySubmitted,

    /// The operation needs a logged-in user.
    #[error("not logged in or session expired")]
    NotLoggedIn,

    /// The server answered 2xx without the expected payload.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Persisting the session failed.
    #[error("session storage failed: {0}")]
    Storage(String),

    /// Pipeline failure, message passed through unchanged.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_message_preferred() {
        let err = ApiError::from_status(500, &json!({"success": false, "message": "db down"}));
        assert_eq!(err.to_string(), "db down");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_error_field_used_when_message_missing() {
        let err = ApiError::from_status(400, &json!({"error": "bad username"}));
        assert_eq!(err.to_string(), "bad username");
    }

    #[test]
    fn test_templated_message_without_body() {
        let err = ApiError::from_status(502, &serde_json::Value::Null);
        assert_eq!(err.to_string(), "server error (502)");
    }

    #[test]
    fn test_auth_and_conflict_classification() {
        assert!(ApiError::from_status(401, &json!({})).is_auth_rejected());
        assert!(ApiError::from_status(403, &json!({})).is_auth_rejected());
        assert_eq!(
            ApiError::from_status(409, &json!({})),
            ApiError::Conflict { message: None }
        );
    }

    #[test]
    fn test_no_status_messages() {
        let network = ApiError::Network {
            detail: "connection refused".to_string(),
        };
        assert_eq!(network.to_string(), "no response");
        assert_eq!(network.status(), None);

        let timeout = ApiError::timeout(Duration::from_millis(30_000));
        assert!(timeout.is_timeout());
        assert!(timeout.to_string().starts_with("no response"));

        assert_eq!(ApiError::Client("bad header".to_string()).to_string(), "bad header");
    }

    #[test]
    fn test_store_error_passes_api_message_through() {
        let err = StoreError::from(ApiError::from_status(404, &json!({"message": "not found"})));
        assert_eq!(err.to_string(), "not found");
        assert_eq!(StoreError::AlreadySubmitted.to_string(), "already submitted");
    }
}
