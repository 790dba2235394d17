//! Configuration management for the questionnaire application.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A `.env` file in the working directory is honoured (see [`AppConfig::from_env`]).

use crate::error::AppError;
use questionnaire_client::config::DEFAULT_BASE_URL;
use questionnaire_client::ClientConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend base address, including the `/api` prefix.
    pub api_url: String,
    /// Default request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Questionnaire create/update timeout in milliseconds.
    pub write_timeout_ms: u64,
    /// File holding the persisted credentials. `None` keeps them in memory.
    pub session_file: Option<PathBuf>,
    /// Optional demo login.
    pub credentials: Option<Credentials>,
}

/// Username and password for the demo login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 30_000,
            write_timeout_ms: 20_000,
            session_file: None,
            credentials: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Reads a `.env` file first if one exists. Unparseable numbers fall back
    /// to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let credentials = match (
            non_empty("QUESTIONNAIRE_USERNAME"),
            lookup("QUESTIONNAIRE_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        Self {
            api_url: non_empty("QUESTIONNAIRE_API_URL").unwrap_or(defaults.api_url),
            timeout_ms: lookup("QUESTIONNAIRE_API_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_ms),
            write_timeout_ms: lookup("QUESTIONNAIRE_WRITE_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.write_timeout_ms),
            session_file: non_empty("QUESTIONNAIRE_SESSION_FILE").map(PathBuf::from),
            credentials,
        }
    }

    /// Check values that have no usable fallback.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] for an empty API address or a zero timeout.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.api_url.trim().is_empty() {
            return Err(AppError::Config("QUESTIONNAIRE_API_URL is empty".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(AppError::Config(
                "QUESTIONNAIRE_API_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        if self.write_timeout_ms == 0 {
            return Err(AppError::Config(
                "QUESTIONNAIRE_WRITE_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The client configuration derived from this one.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_write_timeout(Duration::from_millis(self.write_timeout_ms))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.client_config(), ClientConfig::default());
    }

    #[test]
    fn test_reads_every_variable() {
        let config = AppConfig::from_lookup(lookup(&[
            ("QUESTIONNAIRE_API_URL", "https://survey.example.com/api"),
            ("QUESTIONNAIRE_API_TIMEOUT_MS", "5000"),
            ("QUESTIONNAIRE_WRITE_TIMEOUT_MS", "8000"),
            ("QUESTIONNAIRE_SESSION_FILE", "/tmp/session.json"),
            ("QUESTIONNAIRE_USERNAME", "alice"),
            ("QUESTIONNAIRE_PASSWORD", "secret"),
        ]));

        assert_eq!(config.api_url, "https://survey.example.com/api");
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/session.json")));
        assert_eq!(config.credentials.as_ref().unwrap().username, "alice");

        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.write_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[("QUESTIONNAIRE_API_TIMEOUT_MS", "soon")]));
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_username_without_password_is_no_login() {
        let config = AppConfig::from_lookup(lookup(&[("QUESTIONNAIRE_USERNAME", "alice")]));
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_password_is_redacted() {
        let credentials = Credentials {
            username: "alice".to_string(),
            password: "secret".to_string(),
        };
        assert!(!format!("{credentials:?}").contains("secret"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = AppConfig {
            timeout_ms: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
        assert!(AppConfig::default().validate().is_ok());
    }
}
