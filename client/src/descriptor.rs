//! The request descriptor passed through the pipeline.

use crate::error::ApiError;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use std::time::Duration;
use tokio::time::Instant;

/// Default timeout of a request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Everything needed to issue one logical HTTP call.
///
/// Built by a store, then mutated only by the pipeline: request middleware
/// fills in headers and `started_at`, the retry step sets `retry_count`.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Base address, e.g. `http://localhost:8080/api`.
    pub base_address: String,
    /// Path below the base address, e.g. `/questionnaire/list`.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Header map. Keys are case-insensitive and unique.
    pub headers: HeaderMap,
    /// JSON body.
    pub body: Option<serde_json::Value>,
    /// Deadline of a single attempt.
    pub timeout: Duration,
    /// 0 for the first attempt, 1 once the fallback retry was issued.
    pub retry_count: u8,
    /// Set by the timer middleware when the request leaves.
    pub started_at: Option<Instant>,
}

impl RequestDescriptor {
    /// Create a descriptor with the default timeout and no headers.
    #[must_use]
    pub fn new(method: Method, base_address: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            base_address: base_address.into(),
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            retry_count: 0,
            started_at: None,
        }
    }

    /// Full URL without the query string.
    ///
    /// Base and path are joined with exactly one `/`.
    #[must_use]
    pub fn url(&self) -> String {
        let base = self.base_address.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a header, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] if the name or value is not a valid header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ApiError> {
        let name = HeaderName::try_from(name)
            .map_err(|e| ApiError::Client(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| ApiError::Client(format!("invalid header value for {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Whether this is the fallback attempt.
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        self.retry_count > 0
    }

    /// Time since `started_at`, zero if the timer never ran.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.map_or(Duration::ZERO, |start| start.elapsed())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_with_single_slash() {
        let cases = [
            ("http://localhost:8080/api", "/questionnaire/list"),
            ("http://localhost:8080/api/", "/questionnaire/list"),
            ("http://localhost:8080/api/", "questionnaire/list"),
            ("http://localhost:8080/api", "questionnaire/list"),
        ];

        for (base, path) in cases {
            let descriptor = RequestDescriptor::new(Method::GET, base, path);
            assert_eq!(descriptor.url(), "http://localhost:8080/api/questionnaire/list");
        }
    }

    #[test]
    fn test_builder_and_defaults() {
        let descriptor = RequestDescriptor::new(Method::GET, "http://h/api", "/questionnaire/detail")
            .with_query("id", 42)
            .with_timeout(Duration::from_secs(2))
            .with_header("X-Trace", "abc")
            .unwrap();

        assert_eq!(descriptor.query, vec![("id".to_string(), "42".to_string())]);
        assert_eq!(descriptor.timeout, Duration::from_secs(2));
        assert_eq!(descriptor.headers.get("x-trace").unwrap(), "abc");
        assert_eq!(descriptor.retry_count, 0);
        assert!(!descriptor.is_retry());
        assert_eq!(descriptor.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_header_is_client_error() {
        let result = RequestDescriptor::new(Method::GET, "http://h", "/x").with_header("X-Bad", "a\nb");
        assert!(matches!(result, Err(ApiError::Client(_))));
    }

    #[test]
    fn test_default_timeout() {
        let descriptor = RequestDescriptor::new(Method::POST, "http://h", "/x");
        assert_eq!(descriptor.timeout, Duration::from_millis(30_000));
    }
}
