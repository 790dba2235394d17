//! The backend's JSON response envelope.

use serde::{Deserialize, Serialize};

/// `{ "success": bool, "message": string?, "data": T? }`
///
/// Most endpoints wrap their payload in this object. Login and the
/// submission check answer with flat objects instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Server-side success flag.
    #[serde(default)]
    pub success: bool,
    /// Optional human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Payload. Missing `data` decodes as `None`.
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Take the payload out of the envelope.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_without_data() {
        let envelope: ApiEnvelope<serde_json::Value> =
            serde_json::from_str(r#"{"success":true,"message":"deleted"}"#).unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("deleted"));
        assert!(envelope.into_data().is_none());
    }
}
