//! Application errors.

use questionnaire_client::{ApiError, StoreError};
use questionnaire_core::StorageError;
use thiserror::Error;

/// Errors raised while wiring or driving the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Durable session storage failed.
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// The HTTP pipeline could not be built or a request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A domain store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
