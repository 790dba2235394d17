//! Request and response middleware.
//!
//! Middleware are applied in list order. Request middleware rewrite the
//! outgoing [`RequestDescriptor`]; response middleware observe (and may
//! rewrite) the classified outcome of an attempt.
//!
//! # Standard chain
//!
//! Request side, in order:
//!
//! 1. [`DefaultHeaders`]: JSON content type and no-cache headers
//! 2. [`CorrelationId`]: `X-Correlation-ID` when the caller set none
//! 3. [`RequestTimer`]: stamps `started_at`
//! 4. [`BearerAuth`]: `Authorization: Bearer <token>` from the current session
//!
//! Response side, in order:
//!
//! 1. [`ResponseLogger`]: logs and records metrics
//! 2. [`AuthRejection`]: invalidates the session on 401/403

use crate::descriptor::RequestDescriptor;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::transport::RawResponse;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use std::sync::Arc;

/// Header carrying the request's correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Classified outcome of one attempt.
pub type Outcome = Result<RawResponse, ApiError>;

/// Rewrites a request before it is sent.
pub trait RequestMiddleware: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &'static str;

    /// Transform the descriptor.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the call before anything is sent.
    fn on_request(&self, request: RequestDescriptor) -> Result<RequestDescriptor, ApiError>;

    /// Whether this middleware runs again before the fallback retry.
    fn reapply_on_retry(&self) -> bool {
        false
    }
}

/// Observes the outcome of an attempt.
pub trait ResponseMiddleware: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &'static str;

    /// Inspect or transform the outcome.
    fn on_response(&self, request: &RequestDescriptor, outcome: Outcome) -> Outcome;
}

/// Ordered request and response middleware.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    request: Vec<Arc<dyn RequestMiddleware>>,
    response: Vec<Arc<dyn ResponseMiddleware>>,
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let request: Vec<_> = self.request.iter().map(|m| m.name()).collect();
        let response: Vec<_> = self.response.iter().map(|m| m.name()).collect();
        f.debug_struct("MiddlewareChain")
            .field("request", &request)
            .field("response", &response)
            .finish()
    }
}

impl MiddlewareChain {
    /// Empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain bound to `session`.
    #[must_use]
    pub fn standard(session: &SessionStore) -> Self {
        Self::new()
            .with_request(DefaultHeaders)
            .with_request(CorrelationId)
            .with_request(RequestTimer)
            .with_request(BearerAuth::new(session.clone()))
            .with_response(ResponseLogger)
            .with_response(AuthRejection::new(session.clone()))
    }

    /// Append a request middleware.
    #[must_use]
    pub fn with_request(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.request.push(Arc::new(middleware));
        self
    }

    /// Append a response middleware.
    #[must_use]
    pub fn with_response(mut self, middleware: impl ResponseMiddleware + 'static) -> Self {
        self.response.push(Arc::new(middleware));
        self
    }

    /// Run every request middleware.
    ///
    /// # Errors
    ///
    /// Stops at the first middleware that fails.
    pub fn apply_request(&self, request: RequestDescriptor) -> Result<RequestDescriptor, ApiError> {
        self.request.iter().try_fold(request, |request, middleware| {
            middleware.on_request(request)
        })
    }

    /// Run the middleware flagged [`RequestMiddleware::reapply_on_retry`].
    ///
    /// # Errors
    ///
    /// Stops at the first middleware that fails.
    pub fn reapply_for_retry(
        &self,
        request: RequestDescriptor,
    ) -> Result<RequestDescriptor, ApiError> {
        self.request
            .iter()
            .filter(|middleware| middleware.reapply_on_retry())
            .try_fold(request, |request, middleware| middleware.on_request(request))
    }

    /// Run every response middleware.
    #[must_use]
    pub fn apply_response(&self, request: &RequestDescriptor, outcome: Outcome) -> Outcome {
        self.response
            .iter()
            .fold(outcome, |outcome, middleware| middleware.on_response(request, outcome))
    }
}

/// Sets the JSON and no-cache headers unless the caller already did.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHeaders;

impl RequestMiddleware for DefaultHeaders {
    fn name(&self) -> &'static str {
        "default_headers"
    }

    fn on_request(&self, mut request: RequestDescriptor) -> Result<RequestDescriptor, ApiError> {
        let defaults = [
            (CONTENT_TYPE, "application/json"),
            (CACHE_CONTROL, "no-cache"),
            (PRAGMA, "no-cache"),
        ];
        for (name, value) in defaults {
            request
                .headers
                .entry(name)
                .or_insert(HeaderValue::from_static(value));
        }
        Ok(request)
    }
}

/// Adds a v4 UUID correlation id unless one is present.
///
/// Not re-applied on retry, so both attempts carry the same id.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationId;

impl RequestMiddleware for CorrelationId {
    fn name(&self) -> &'static str {
        "correlation_id"
    }

    fn on_request(&self, mut request: RequestDescriptor) -> Result<RequestDescriptor, ApiError> {
        let name = HeaderName::from_static(CORRELATION_ID_HEADER);
        if !request.headers.contains_key(&name) {
            let id = uuid::Uuid::new_v4().to_string();
            let value = HeaderValue::try_from(id).map_err(|e| ApiError::Client(e.to_string()))?;
            request.headers.insert(name, value);
        }
        Ok(request)
    }
}

/// Records when the logical request started.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTimer;

impl RequestMiddleware for RequestTimer {
    fn name(&self) -> &'static str {
        "request_timer"
    }

    fn on_request(&self, mut request: RequestDescriptor) -> Result<RequestDescriptor, ApiError> {
        request.started_at = Some(tokio::time::Instant::now());
        tracing::debug!(
            method = %request.method,
            url = %request.url(),
            timeout_ms = u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX),
            "Sending request"
        );
        Ok(request)
    }
}

/// Injects the bearer token of the current session.
///
/// The token is read when the middleware runs, never cached. It runs again
/// before the fallback retry, so a token that changed in between is used.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    session: SessionStore,
}

impl BearerAuth {
    /// Bind to a session.
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

impl RequestMiddleware for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn on_request(&self, mut request: RequestDescriptor) -> Result<RequestDescriptor, ApiError> {
        let token = self.session.token();
        if token.is_empty() {
            request.headers.remove(AUTHORIZATION);
        } else {
            let mut value = HeaderValue::try_from(format!("Bearer {token}"))
                .map_err(|e| ApiError::Client(format!("invalid bearer token: {e}")))?;
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
        }
        Ok(request)
    }

    fn reapply_on_retry(&self) -> bool {
        true
    }
}

/// Logs each attempt and records request metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseLogger;

impl ResponseMiddleware for ResponseLogger {
    fn name(&self) -> &'static str {
        "response_logger"
    }

    fn on_response(&self, request: &RequestDescriptor, outcome: Outcome) -> Outcome {
        let elapsed = request.elapsed();
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let retried = request.is_retry();

        let status_label = match &outcome {
            Ok(response) => {
                tracing::info!(
                    method = %request.method,
                    path = %request.path,
                    status = response.status,
                    elapsed_ms,
                    retried,
                    "Request completed"
                );
                response.status.to_string()
            }
            Err(error) => {
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    status = ?error.status(),
                    elapsed_ms,
                    retried,
                    %error,
                    "Request failed"
                );
                error
                    .status()
                    .map_or_else(|| "none".to_string(), |status| status.to_string())
            }
        };

        metrics::counter!(
            "questionnaire_client_requests_total",
            "method" => request.method.to_string(),
            "status" => status_label,
            "retried" => if retried { "true" } else { "false" }
        )
        .increment(1);
        metrics::histogram!("questionnaire_client_request_duration_seconds")
            .record(elapsed.as_secs_f64());

        outcome
    }
}

/// Invalidates the session when the server rejects the credentials.
///
/// Fires for every 401/403, whichever endpoint and whichever attempt.
#[derive(Debug, Clone)]
pub struct AuthRejection {
    session: SessionStore,
}

impl AuthRejection {
    /// Bind to a session.
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

impl ResponseMiddleware for AuthRejection {
    fn name(&self) -> &'static str {
        "auth_rejection"
    }

    fn on_response(&self, request: &RequestDescriptor, outcome: Outcome) -> Outcome {
        if let Err(ApiError::AuthRejected { status, .. }) = &outcome {
            self.session.invalidate(*status, &request.path);
        }
        outcome
    }
}
