//! Client configuration.

use std::time::Duration;

/// Default backend address, including the `/api` prefix.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Configuration of the HTTP pipeline and the domain stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address every path is joined to.
    pub base_url: String,

    /// Default per-request timeout.
    pub timeout: Duration,

    /// Timeout of questionnaire create and update calls.
    pub write_timeout: Duration,

    /// Page size assumed when the server omits it.
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(20),
            page_size: 10,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given base address.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the default request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the questionnaire create/update timeout.
    #[must_use]
    pub const fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the fallback page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}
