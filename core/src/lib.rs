//! # Questionnaire Core
//!
//! Domain types and pure logic shared by the questionnaire client crates.
//!
//! This crate has no I/O apart from the durable credential storage and
//! contains everything that can be tested at memory speed:
//!
//! - **Session**: the authenticated user's token and profile ([`session`])
//! - **Storage**: durable key-value storage for credentials ([`storage`])
//! - **Wire types**: questionnaires, answers, admin views ([`questionnaire`], [`admin`])
//! - **Routing**: the static route table and the authorization guard ([`routes`], [`guard`])
//!
//! ## Example
//!
//! ```
//! use questionnaire_core::guard::{GuardDecision, Redirect, RouteGuard};
//! use questionnaire_core::session::Session;
//!
//! let guard = RouteGuard::default();
//! let request = guard.classify("/admin/users", false);
//!
//! // Anonymous sessions are sent to the login page.
//! assert_eq!(
//!     guard.decide(&request, &Session::default()),
//!     GuardDecision::Redirect(Redirect::Login)
//! );
//! ```

pub mod admin;
pub mod envelope;
pub mod guard;
pub mod questionnaire;
pub mod routes;
pub mod session;
pub mod storage;

// Re-export main types for convenience
pub use envelope::ApiEnvelope;
pub use guard::{GuardDecision, NavigationRequest, Redirect, RouteGuard};
pub use questionnaire::{visible_to, Questionnaire, QuestionnaireSummary};
pub use routes::{Route, RouteMatch, RouteTable};
pub use session::{LoginRequest, LoginResponse, Session, UserInfo};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage, StorageError};
