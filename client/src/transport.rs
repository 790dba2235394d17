//! Transports that actually put a request on the wire.
//!
//! The pipeline holds two of them:
//!
//! - a **primary** transport ([`ReqwestTransport`]) with a pooled connection
//!   set and reqwest's own per-request timeout
//! - a **fallback** transport ([`FallbackTransport`]) used for the single
//!   retry after a timeout. It shares no state with the primary: its client
//!   keeps no idle connections and the deadline is enforced from outside.
//!
//! Both turn any response, whatever its status, into a [`RawResponse`].
//! Status classification happens in the pipeline.

use crate::descriptor::RequestDescriptor;
use crate::error::ApiError;
use futures::future::BoxFuture;
use http::header::{HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;

/// A response as received, before status classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body. Empty bodies are `Null`, non-JSON bodies a JSON string.
    pub body: serde_json::Value,
}

impl RawResponse {
    /// Build a response.
    #[must_use]
    pub const fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failure: no response was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The deadline elapsed.
    #[error("request timed out after {after:?}")]
    Timeout {
        /// The deadline that elapsed.
        after: Duration,
    },

    /// Connection refused, reset, DNS failure...
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Client(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { after } => Self::timeout(after),
            TransportError::Network(detail) => Self::Network { detail },
            TransportError::Client(message) => Self::Client(message),
        }
    }
}

/// Something that can execute a [`RequestDescriptor`].
///
/// Object safe so the pipeline can hold `Arc<dyn Transport>`.
pub trait Transport: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Execute the request and return whatever came back.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no response was received.
    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>>;
}

/// Decode a response body.
fn decode_body(bytes: &[u8]) -> serde_json::Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn classify_reqwest_error(err: &reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { after: timeout }
    } else if err.is_builder() {
        TransportError::Client(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

/// Primary transport backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh pooled client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "primary"
    }

    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method.clone(), request.url())
                .headers(request.headers.clone())
                .timeout(request.timeout);

            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| classify_reqwest_error(&e, request.timeout))?;

            let status = response.status().as_u16();
            let bytes = response
                .bytes()
                .await
                .map_err(|e| classify_reqwest_error(&e, request.timeout))?;

            Ok(RawResponse::new(status, decode_body(&bytes)))
        })
    }
}

/// Fallback transport: a bare client with no idle pool.
///
/// The body is serialised here rather than by reqwest, and the deadline is
/// enforced with [`tokio::time::timeout`] around the whole exchange.
#[derive(Debug, Clone)]
pub struct FallbackTransport {
    client: reqwest::Client,
}

impl FallbackTransport {
    /// Create the fallback transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn exchange(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        let mut headers = request.headers.clone();
        let mut builder = self.client.request(request.method.clone(), request.url());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            let bytes =
                serde_json::to_vec(body).map_err(|e| TransportError::Client(e.to_string()))?;
            headers
                .entry(CONTENT_TYPE)
                .or_insert(HeaderValue::from_static("application/json"));
            builder = builder.body(bytes);
        }

        let response = builder
            .headers(headers)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e, request.timeout))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e, request.timeout))?;

        Ok(RawResponse::new(status, decode_body(&bytes)))
    }
}

impl Transport for FallbackTransport {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        Box::pin(async move {
            tokio::time::timeout(request.timeout, self.exchange(request))
                .await
                .map_err(|_| TransportError::Timeout {
                    after: request.timeout,
                })?
        })
    }
}
