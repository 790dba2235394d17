//! The HTTP request pipeline.
//!
//! Every backend call goes through [`HttpPipeline::send`]:
//!
//! 1. check the descriptor (non-empty path, non-zero timeout)
//! 2. run the request middleware
//! 3. execute on the primary transport
//! 4. on timeout, retry once on the fallback transport
//! 5. classify the response status
//! 6. run the response middleware
//! 7. hand back the JSON body

use crate::config::ClientConfig;
use crate::descriptor::RequestDescriptor;
use crate::error::{ApiError, Result};
use crate::middleware::{MiddlewareChain, Outcome};
use crate::retry::retry_once_on_timeout;
use crate::session::SessionStore;
use crate::transport::{FallbackTransport, RawResponse, ReqwestTransport, Transport};
use http::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Shared request pipeline. Cloning is cheap.
#[derive(Clone)]
pub struct HttpPipeline {
    base_url: String,
    timeout: Duration,
    primary: Arc<dyn Transport>,
    fallback: Arc<dyn Transport>,
    middleware: MiddlewareChain,
}

impl std::fmt::Debug for HttpPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPipeline")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.name())
            .field("middleware", &self.middleware)
            .finish()
    }
}

impl HttpPipeline {
    /// Pipeline with the reqwest transports and the standard middleware.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] if an HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: &SessionStore) -> Result<Self> {
        Ok(Self::with_transports(
            config,
            Arc::new(ReqwestTransport::new()?),
            Arc::new(FallbackTransport::new()?),
            MiddlewareChain::standard(session),
        ))
    }

    /// Pipeline with explicit transports and middleware.
    #[must_use]
    pub fn with_transports(
        config: &ClientConfig,
        primary: Arc<dyn Transport>,
        fallback: Arc<dyn Transport>,
        middleware: MiddlewareChain,
    ) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            primary,
            fallback,
            middleware,
        }
    }

    /// Base address of every request.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a descriptor for `path` with the configured defaults.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestDescriptor {
        RequestDescriptor::new(method, self.base_url.clone(), path).with_timeout(self.timeout)
    }

    /// Send a request and return the JSON body of the response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for rejected descriptors, transport failures and
    /// non-2xx statuses. 401 and 403 have already invalidated the session
    /// when this returns.
    pub async fn send(&self, request: RequestDescriptor) -> Result<serde_json::Value> {
        validate(&request)?;
        let request = self.middleware.apply_request(request)?;

        let primary = Arc::clone(&self.primary);
        let fallback = Arc::clone(&self.fallback);

        let (request, outcome) = retry_once_on_timeout(
            request,
            move |request: RequestDescriptor| {
                let transport = if request.is_retry() {
                    Arc::clone(&fallback)
                } else {
                    Arc::clone(&primary)
                };
                async move {
                    let outcome = transport
                        .execute(&request)
                        .await
                        .map_err(ApiError::from)
                        .and_then(classify);
                    (request, outcome)
                }
            },
            |retry| self.middleware.reapply_for_retry(retry),
        )
        .await;

        let response = self.middleware.apply_response(&request, outcome)?;
        Ok(response.body)
    }

    /// Send a request and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// Everything [`send`](Self::send) returns, plus [`ApiError::Decode`].
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        let body = self.send(request).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn validate(request: &RequestDescriptor) -> Result<()> {
    if request.path.trim().is_empty() {
        return Err(ApiError::Client("request path is empty".to_string()));
    }
    if request.timeout.is_zero() {
        return Err(ApiError::Client("request timeout must be positive".to_string()));
    }
    Ok(())
}

fn classify(response: RawResponse) -> Outcome {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_status(response.status, &response.body))
    }
}
