//! Login, registration and logout.

use crate::error::{ApiError, StoreError};
use crate::pipeline::HttpPipeline;
use crate::session::SessionStore;
use http::Method;
use questionnaire_core::{LoginRequest, LoginResponse, Session};

/// User account operations.
#[derive(Debug, Clone)]
pub struct UserStore {
    pipeline: HttpPipeline,
    session: SessionStore,
}

impl UserStore {
    /// Create the store.
    #[must_use]
    pub const fn new(pipeline: HttpPipeline, session: SessionStore) -> Self {
        Self { pipeline, session }
    }

    /// Log in and replace the session with the returned one.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Api`] if the backend refuses (the server's message is kept)
    /// - [`StoreError::MalformedResponse`] if no token came back
    /// - [`StoreError::Storage`] if the session cannot be persisted
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, StoreError> {
        tracing::info!(username, "Logging in");

        let body = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .map_err(|e| ApiError::Client(e.to_string()))?;

        let request = self.pipeline.request(Method::POST, "/user/login").with_body(body);
        let response: LoginResponse = self.pipeline.send_json(request).await.inspect_err(|error| {
            tracing::warn!(username, %error, "Login failed");
        })?;

        if response.token.is_empty() {
            return Err(StoreError::MalformedResponse(
                "login response carries no token".to_string(),
            ));
        }

        self.session.save(Session::from(response.clone()))?;
        tracing::info!(user_id = response.user_id, is_admin = response.is_admin, "Logged in");
        Ok(response)
    }

    /// Register a new account. The fields are sent as given.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] with the server's message on failure.
    pub async fn register(&self, fields: serde_json::Value) -> Result<serde_json::Value, StoreError> {
        let request = self.pipeline.request(Method::POST, "/user/register").with_body(fields);
        let body = self.pipeline.send(request).await.inspect_err(|error| {
            tracing::warn!(%error, "Registration failed");
        })?;
        tracing::info!("Registered");
        Ok(body)
    }

    /// Log out locally. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the persisted credentials could not
    /// be removed. The in-memory session is anonymous either way.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.session.clear()?;
        Ok(())
    }
}
