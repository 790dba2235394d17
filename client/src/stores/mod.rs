//! Domain stores.
//!
//! Each store wraps the shared [`HttpPipeline`](crate::pipeline::HttpPipeline),
//! builds the descriptors of its endpoints and, where the UI needs it, keeps
//! the last fetched results.

pub mod admin;
pub mod questionnaire;
pub mod user;

pub use admin::AdminStore;
pub use questionnaire::{QuestionnaireState, QuestionnaireStore};
pub use user::UserStore;

use crate::error::{ApiError, StoreError};
use questionnaire_core::ApiEnvelope;
use serde::de::DeserializeOwned;

/// Unwrap `data` of an enveloped body.
///
/// A body that is not an envelope is a decode error; an envelope without
/// `data` yields `None`.
pub(crate) fn envelope_data<T: DeserializeOwned>(
    body: serde_json::Value,
) -> Result<Option<T>, StoreError> {
    let envelope: ApiEnvelope<T> =
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(envelope.into_data())
}

/// Like [`envelope_data`] but a missing `data` is an error.
pub(crate) fn required_data<T: DeserializeOwned>(
    body: serde_json::Value,
    what: &str,
) -> Result<T, StoreError> {
    envelope_data(body)?
        .ok_or_else(|| StoreError::MalformedResponse(format!("{what}: response carries no data")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_helpers() {
        let present: Option<u64> = envelope_data(json!({"success": true, "data": 3})).unwrap();
        assert_eq!(present, Some(3));

        let missing: Option<u64> = envelope_data(json!({"success": true})).unwrap();
        assert_eq!(missing, None);

        let err = required_data::<u64>(json!({"success": true}), "detail").unwrap_err();
        assert!(matches!(err, StoreError::MalformedResponse(_)));

        let not_envelope = envelope_data::<u64>(json!("oops")).unwrap_err();
        assert!(matches!(not_envelope, StoreError::Api(ApiError::Decode(_))));
    }
}
