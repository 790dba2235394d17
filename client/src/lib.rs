//! # Questionnaire Client
//!
//! HTTP client for the questionnaire backend.
//!
//! - [`session::SessionStore`]: the authenticated user, persisted through a
//!   [`questionnaire_core::CredentialStorage`]
//! - [`pipeline::HttpPipeline`]: every backend call, with bearer injection,
//!   logging, a single fallback retry on timeout and global logout on 401/403
//! - [`stores`]: user, questionnaire and admin operations
//!
//! ## Example
//!
//! ```no_run
//! use questionnaire_client::{ClientConfig, HttpPipeline, SessionStore};
//! use questionnaire_client::stores::{QuestionnaireStore, UserStore};
//! use questionnaire_core::MemoryStorage;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let session = SessionStore::load(Arc::new(MemoryStorage::new()))?;
//! let pipeline = HttpPipeline::new(&config, &session)?;
//!
//! let users = UserStore::new(pipeline.clone(), session.clone());
//! users.login("alice", "secret").await?;
//!
//! let questionnaires = QuestionnaireStore::new(pipeline, session, &config);
//! for entry in questionnaires.fetch_list(1).await? {
//!     println!("{}", entry.questionnaire.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod retry;
pub mod session;
pub mod stores;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use descriptor::RequestDescriptor;
pub use error::{ApiError, StoreError};
pub use middleware::{MiddlewareChain, RequestMiddleware, ResponseMiddleware};
pub use pipeline::HttpPipeline;
pub use session::{SessionEvent, SessionStore};
pub use transport::{FallbackTransport, RawResponse, ReqwestTransport, Transport, TransportError};
