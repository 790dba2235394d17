//! Wiring of the client components into one application value.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::navigator::Navigator;
use questionnaire_client::stores::{AdminStore, QuestionnaireStore, UserStore};
use questionnaire_client::{ClientConfig, HttpPipeline, SessionStore};
use questionnaire_core::{CredentialStorage, FileStorage, LoginResponse, MemoryStorage};
use std::sync::Arc;

/// Every long-lived component of the application.
///
/// Stores share one pipeline and one session store; the navigator reads the
/// same session for its guard decisions.
#[derive(Debug, Clone)]
pub struct QuestionnaireApp {
    /// Session store.
    pub session: SessionStore,
    /// Request pipeline.
    pub pipeline: HttpPipeline,
    /// User store.
    pub users: UserStore,
    /// Questionnaire store.
    pub questionnaires: QuestionnaireStore,
    /// Admin store.
    pub admin: AdminStore,
    /// Navigator.
    pub navigator: Navigator,
}

impl QuestionnaireApp {
    /// Build the application from configuration.
    ///
    /// Restores the persisted session before any request can be made.
    ///
    /// # Errors
    ///
    /// - [`AppError::Config`] if the configuration is invalid
    /// - [`AppError::Storage`] if the persisted session cannot be read
    /// - [`AppError::Api`] if the HTTP transports cannot be built
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        config.validate()?;

        let storage: Arc<dyn CredentialStorage> = match &config.session_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using file-backed session storage");
                Arc::new(FileStorage::new(path.clone()))
            }
            None => {
                tracing::info!("Using in-memory session storage");
                Arc::new(MemoryStorage::new())
            }
        };

        let session = SessionStore::load(storage)?;
        let client_config = config.client_config();
        let pipeline = HttpPipeline::new(&client_config, &session)?;

        tracing::info!(
            base_url = %client_config.base_url,
            logged_in = session.is_logged_in(),
            "Application initialised"
        );

        Ok(Self::from_parts(&client_config, session, pipeline))
    }

    /// Assemble the application around an existing session and pipeline.
    #[must_use]
    pub fn from_parts(config: &ClientConfig, session: SessionStore, pipeline: HttpPipeline) -> Self {
        Self {
            users: UserStore::new(pipeline.clone(), session.clone()),
            questionnaires: QuestionnaireStore::new(pipeline.clone(), session.clone(), config),
            admin: AdminStore::new(pipeline.clone()),
            navigator: Navigator::new(session.clone()),
            session,
            pipeline,
        }
    }

    /// Log in with the configured credentials, if there are any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the login fails.
    pub async fn sign_in(&self, config: &AppConfig) -> Result<Option<LoginResponse>, AppError> {
        let Some(credentials) = &config.credentials else {
            return Ok(None);
        };

        let response = self
            .users
            .login(&credentials.username, &credentials.password)
            .await?;
        Ok(Some(response))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AppConfig {
            api_url: "  ".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            QuestionnaireApp::from_config(&config),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_default_config_starts_anonymous_at_home() {
        let app = QuestionnaireApp::from_config(&AppConfig::default()).unwrap();
        assert!(!app.session.is_logged_in());
        assert_eq!(app.navigator.current(), "/");
        assert_eq!(app.pipeline.base_url(), "http://localhost:8080/api");
    }

    #[tokio::test]
    async fn test_sign_in_without_credentials_is_skipped() {
        let app = QuestionnaireApp::from_config(&AppConfig::default()).unwrap();
        assert!(app.sign_in(&AppConfig::default()).await.unwrap().is_none());
    }
}
