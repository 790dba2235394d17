//! A fully wired client over scripted transports.

use questionnaire_client::mocks::MockTransport;
use questionnaire_client::stores::{AdminStore, QuestionnaireStore, UserStore};
use questionnaire_client::{ClientConfig, HttpPipeline, MiddlewareChain, SessionStore};
use questionnaire_core::{MemoryStorage, Session};
use std::sync::Arc;

/// Base address used by the harness.
pub const TEST_BASE_URL: &str = "http://questionnaire.test/api";

/// Every client component, wired the way an application wires them, with
/// [`MockTransport`]s in place of the network.
///
/// Script responses on `primary` (and on `fallback` for retry scenarios),
/// then drive the stores.
#[derive(Debug, Clone)]
pub struct TestHarness {
    /// Configuration in use.
    pub config: ClientConfig,
    /// Durable storage behind the session.
    pub storage: Arc<MemoryStorage>,
    /// The session store.
    pub session: SessionStore,
    /// Primary transport.
    pub primary: MockTransport,
    /// Fallback transport.
    pub fallback: MockTransport,
    /// Pipeline with the standard middleware.
    pub pipeline: HttpPipeline,
    /// User store.
    pub users: UserStore,
    /// Questionnaire store.
    pub questionnaires: QuestionnaireStore,
    /// Admin store.
    pub admin: AdminStore,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Anonymous harness.
    #[must_use]
    pub fn new() -> Self {
        Self::build(Session::default(), MockTransport::new("primary"))
    }

    /// Harness whose session (and storage) already hold `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self::build(session, MockTransport::new("primary"))
    }

    /// Harness with a custom primary transport, e.g. one with a hook.
    #[must_use]
    pub fn with_primary(session: Session, primary: MockTransport) -> Self {
        Self::build(session, primary)
    }

    fn build(session: Session, primary: MockTransport) -> Self {
        let config = ClientConfig::new(TEST_BASE_URL);
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::with_session(storage.clone(), Session::default());
        if session.is_logged_in() {
            // MemoryStorage cannot fail.
            let _ = store.save(session);
        }

        let fallback = MockTransport::new("fallback");
        let pipeline = HttpPipeline::with_transports(
            &config,
            Arc::new(primary.clone()),
            Arc::new(fallback.clone()),
            MiddlewareChain::standard(&store),
        );

        Self {
            users: UserStore::new(pipeline.clone(), store.clone()),
            questionnaires: QuestionnaireStore::new(pipeline.clone(), store.clone(), &config),
            admin: AdminStore::new(pipeline.clone()),
            config,
            storage,
            session: store,
            primary,
            fallback,
            pipeline,
        }
    }
}
