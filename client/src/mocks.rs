//! Scripted transport for tests.
//!
//! # Example
//!
//! ```
//! use questionnaire_client::mocks::MockTransport;
//! use serde_json::json;
//!
//! let transport = MockTransport::new("primary");
//! transport.push_json(200, json!({"success": true}));
//! transport.push_timeout();
//! assert_eq!(transport.remaining(), 2);
//! ```

use crate::descriptor::RequestDescriptor;
use crate::transport::{RawResponse, Transport, TransportError};
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type Hook = Arc<dyn Fn(&RequestDescriptor) + Send + Sync>;

struct Scripted {
    outcome: Result<RawResponse, TransportError>,
    delay: Option<Duration>,
}

/// A transport that replays scripted outcomes in order.
///
/// Every executed request is recorded and takes the next outcome as soon as
/// it arrives, so overlapping requests can be made to finish out of order
/// with [`push_delayed`](Self::push_delayed). When the script runs dry the
/// transport answers with a network error.
#[derive(Clone)]
pub struct MockTransport {
    name: &'static str,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<RequestDescriptor>>>,
    hook: Option<Hook>,
    delay: Option<Duration>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("name", &self.name)
            .field("remaining", &self.remaining())
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Create an empty mock.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            hook: None,
            delay: None,
        }
    }

    /// Run `hook` on every request before answering it.
    #[must_use]
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestDescriptor) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Sleep before answering each request, on top of any per-outcome delay.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue an outcome.
    pub fn push(&self, outcome: Result<RawResponse, TransportError>) {
        lock(&self.script).push_back(Scripted {
            outcome,
            delay: None,
        });
    }

    /// Queue a response delivered `delay` after the request arrives.
    pub fn push_delayed(&self, status: u16, body: serde_json::Value, delay: Duration) {
        lock(&self.script).push_back(Scripted {
            outcome: Ok(RawResponse::new(status, body)),
            delay: Some(delay),
        });
    }

    /// Queue a response.
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push(Ok(RawResponse::new(status, body)));
    }

    /// Queue a timeout.
    pub fn push_timeout(&self) {
        self.push(Err(TransportError::Timeout {
            after: Duration::from_millis(30_000),
        }));
    }

    /// Queue a connection failure.
    pub fn push_network_error(&self, detail: &str) {
        self.push(Err(TransportError::Network(detail.to_string())));
    }

    /// Requests seen so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        lock(&self.requests).clone()
    }

    /// Most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<RequestDescriptor> {
        lock(&self.requests).last().cloned()
    }

    /// Number of executed requests.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Outcomes not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        Box::pin(async move {
            lock(&self.requests).push(request.clone());
            if let Some(hook) = &self.hook {
                hook(request);
            }
            let next = lock(&self.script).pop_front();

            let delay = self.delay.unwrap_or_default()
                + next.as_ref().and_then(|s| s.delay).unwrap_or_default();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            next.map_or_else(
                || {
                    Err(TransportError::Network(format!(
                        "{}: no scripted response for {} {}",
                        self.name, request.method, request.path
                    )))
                },
                |scripted| scripted.outcome,
            )
        })
    }
}
