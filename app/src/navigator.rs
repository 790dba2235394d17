//! Current location, guarded navigation and the session invalidation listener.

use crate::view::ViewScope;
use questionnaire_client::{SessionEvent, SessionStore};
use questionnaire_core::routes::LOGIN_PATH;
use questionnaire_core::{GuardDecision, Redirect, RouteGuard, RouteMatch, RouteTable};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Result of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The requested location is now current.
    Arrived {
        /// The new location.
        path: String,
        /// Matching route, `None` for paths outside the route table.
        route: Option<RouteMatch>,
    },
    /// The guard refused; the redirect target is now current.
    Redirected {
        /// The refused location.
        from: String,
        /// Where the user was sent instead.
        to: Redirect,
    },
}

impl NavigationOutcome {
    /// The location that became current.
    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Self::Arrived { path, .. } => path,
            Self::Redirected { to, .. } => to.path(),
        }
    }
}

/// Owns the current location and applies the route guard to every move.
///
/// Cheap to clone; clones share the location.
#[derive(Debug, Clone)]
pub struct Navigator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    routes: RouteTable,
    guard: RouteGuard,
    session: SessionStore,
    location: Arc<Location>,
}

/// The location cell, shared with the invalidation listener.
///
/// The listener must not own the session store, otherwise the event channel
/// would never close.
#[derive(Debug)]
struct Location {
    current: watch::Sender<String>,
    generation: Arc<AtomicU64>,
}

impl Location {
    fn move_to(&self, path: &str) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.current.send_replace(path.to_string());
    }
}

impl Navigator {
    /// Create a navigator positioned at the home page.
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self::with_routes(session, RouteTable::default(), RouteGuard::default())
    }

    /// Create a navigator with a custom route table and guard.
    #[must_use]
    pub fn with_routes(session: SessionStore, routes: RouteTable, guard: RouteGuard) -> Self {
        let (current, _) = watch::channel(Redirect::Home.path().to_string());
        Self {
            inner: Arc::new(Inner {
                routes,
                guard,
                session,
                location: Arc::new(Location {
                    current,
                    generation: Arc::new(AtomicU64::new(0)),
                }),
            }),
        }
    }

    /// Try to move to `path`.
    ///
    /// The destination is resolved against the route table, classified and
    /// checked against the current session. Either the destination or the
    /// redirect target becomes the current location.
    pub fn navigate(&self, path: &str) -> NavigationOutcome {
        let resolved = self.inner.routes.resolve(path);
        let route_requires_admin = resolved.as_ref().is_some_and(|m| m.route.requires_admin);
        let request = self.inner.guard.classify(path, route_requires_admin);
        let session = self.inner.session.snapshot();

        match self.inner.guard.decide(&request, &session) {
            GuardDecision::Allow => {
                self.move_to(path);
                tracing::info!(path, route = resolved.as_ref().map(|m| m.route.name), "Navigated");
                NavigationOutcome::Arrived {
                    path: path.to_string(),
                    route: resolved,
                }
            }
            GuardDecision::Redirect(redirect) => {
                self.move_to(redirect.path());
                tracing::info!(from = path, to = redirect.path(), "Navigation redirected");
                NavigationOutcome::Redirected {
                    from: path.to_string(),
                    to: redirect,
                }
            }
        }
    }

    /// The current location.
    #[must_use]
    pub fn current(&self) -> String {
        self.inner.location.current.borrow().clone()
    }

    /// Watch location changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.inner.location.current.subscribe()
    }

    /// Capture a scope for the view mounted at the current location.
    #[must_use]
    pub fn scope(&self) -> ViewScope {
        ViewScope::new(self.inner.location.generation.clone(), self.current())
    }

    /// Spawn the task that sends the user to the login page whenever the
    /// server rejects the session.
    ///
    /// The task ends when the session store is dropped.
    pub fn spawn_invalidation_listener(&self) -> JoinHandle<()> {
        let location = Arc::clone(&self.inner.location);
        let mut events = self.inner.session.events();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Invalidated { status, path }) => {
                        tracing::warn!(status, request_path = %path, "Session rejected, returning to login");
                        location.move_to(LOGIN_PATH);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Invalidation listener lagged");
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Session events closed, invalidation listener stopping");
                        break;
                    }
                }
            }
        })
    }

    fn move_to(&self, path: &str) {
        self.inner.location.move_to(path);
    }
}
