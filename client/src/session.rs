//! The session store: single source of truth for the authenticated user.
//!
//! Durable storage is read exactly once, in [`SessionStore::load`]. After
//! that the in-memory session is authoritative and durable storage is only
//! written to.
//!
//! The session lives in a [`tokio::sync::watch`] channel and is always
//! replaced whole, so any reader observes either the previous or the next
//! session and never a mix of both.

use questionnaire_core::storage::{TOKEN_KEY, USER_INFO_KEY};
use questionnaire_core::{CredentialStorage, Session, StorageError, UserInfo};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 16;

/// Session transitions, broadcast to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login replaced the session.
    LoggedIn {
        /// The new user.
        user_id: u64,
    },
    /// The user logged out.
    LoggedOut,
    /// The server rejected the credentials and the session was dropped.
    Invalidated {
        /// 401 or 403.
        status: u16,
        /// Path of the rejected request.
        path: String,
    },
}

struct Inner {
    storage: Arc<dyn CredentialStorage>,
    state: watch::Sender<Session>,
    events: broadcast::Sender<SessionEvent>,
}

/// Shared handle to the session. Cloning is cheap.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.inner.state.borrow();
        f.debug_struct("SessionStore")
            .field("logged_in", &session.is_logged_in())
            .field("user_id", &session.user_id)
            .field("storage", &self.inner.storage)
            .finish()
    }
}

impl SessionStore {
    /// Read the persisted session from `storage`.
    ///
    /// A missing token is the anonymous session. A missing or unreadable
    /// profile is treated as the empty profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend itself cannot be read.
    pub fn load(storage: Arc<dyn CredentialStorage>) -> Result<Self, StorageError> {
        let token = storage.get(TOKEN_KEY)?.unwrap_or_default();
        let user_info = match storage.get(USER_INFO_KEY)? {
            Some(raw) => serde_json::from_str::<UserInfo>(&raw).unwrap_or_else(|error| {
                tracing::warn!(%error, "Stored user profile is not valid JSON, ignoring it");
                UserInfo::default()
            }),
            None => UserInfo::default(),
        };

        let session = Session::from_parts(token, user_info);
        tracing::debug!(
            logged_in = session.is_logged_in(),
            user_id = session.user_id,
            "Session loaded from storage"
        );

        Ok(Self::with_session(storage, session))
    }

    /// Create a store holding `session` without reading `storage`.
    #[must_use]
    pub fn with_session(storage: Arc<dyn CredentialStorage>, session: Session) -> Self {
        let (state, _) = watch::channel(session);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                storage,
                state,
                events,
            }),
        }
    }

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Current bearer token, empty when anonymous.
    #[must_use]
    pub fn token(&self) -> String {
        self.inner.state.borrow().token.clone()
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.inner.state.borrow().is_logged_in()
    }

    /// Whether the current user is an authenticated administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner.state.borrow().is_admin()
    }

    /// Current user id, 0 when anonymous.
    #[must_use]
    pub fn user_id(&self) -> u64 {
        self.inner.state.borrow().user_id
    }

    /// Watch the session value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Receive session transitions from now on.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Persist `session` and make it current.
    ///
    /// Nothing changes in memory if persisting fails.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if durable storage cannot be written.
    pub fn save(&self, session: Session) -> Result<(), StorageError> {
        let profile = serde_json::to_string(&session.user_info())
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;

        self.inner.storage.set(TOKEN_KEY, &session.token)?;
        self.inner.storage.set(USER_INFO_KEY, &profile)?;

        let user_id = session.user_id;
        self.inner.state.send_replace(session);
        self.emit(SessionEvent::LoggedIn { user_id });

        tracing::info!(user_id, "Session saved");
        Ok(())
    }

    /// Log out: drop the persisted credentials and reset to anonymous.
    ///
    /// The in-memory session is reset even when storage fails.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if durable storage could not be cleared.
    pub fn clear(&self) -> Result<(), StorageError> {
        let result = self.reset();
        self.emit(SessionEvent::LoggedOut);
        tracing::info!("Session cleared");
        result
    }

    /// Drop the session after the server rejected it.
    ///
    /// Storage failures are logged; the in-memory session is reset regardless.
    pub fn invalidate(&self, status: u16, path: &str) {
        if let Err(error) = self.reset() {
            tracing::error!(%error, "Failed to clear stored credentials");
        }

        self.emit(SessionEvent::Invalidated {
            status,
            path: path.to_string(),
        });

        metrics::counter!("questionnaire_client_auth_rejections_total").increment(1);
        tracing::warn!(status, path, "Credentials rejected, session invalidated");
    }

    fn reset(&self) -> Result<(), StorageError> {
        let removed_token = self.inner.storage.remove(TOKEN_KEY);
        let removed_profile = self.inner.storage.remove(USER_INFO_KEY);
        self.inner.state.send_replace(Session::default());
        removed_token.and(removed_profile)
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}
