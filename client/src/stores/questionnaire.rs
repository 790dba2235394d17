//! Questionnaire listing, editing, answering and results.

use super::{envelope_data, required_data};
use crate::config::ClientConfig;
use crate::error::{ApiError, StoreError};
use crate::pipeline::HttpPipeline;
use crate::session::SessionStore;
use http::Method;
use questionnaire_core::questionnaire::{
    AnswerSubmission, Question, QuestionnaireDetail, QuestionnaireDraft, QuestionnairePage,
    QuestionnaireResults, SubmissionCheck,
};
use questionnaire_core::{visible_to, Questionnaire, QuestionnaireSummary};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Last fetched list and detail.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionnaireState {
    /// Visible entries of the current page.
    pub list: Vec<QuestionnaireSummary>,
    /// Questionnaire of the last detail fetch.
    pub current: Option<Questionnaire>,
    /// Questions of the last detail fetch.
    pub current_questions: Vec<Question>,
    /// Total number of entries.
    pub total_count: u64,
    /// Current page, 1-based.
    pub current_page: u32,
    /// Page size.
    pub page_size: u32,
}

impl Default for QuestionnaireState {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            current: None,
            current_questions: Vec::new(),
            total_count: 0,
            current_page: 1,
            page_size: 10,
        }
    }
}

/// Questionnaire operations and their cached results.
#[derive(Debug, Clone)]
pub struct QuestionnaireStore {
    pipeline: HttpPipeline,
    session: SessionStore,
    write_timeout: Duration,
    default_page_size: u32,
    state: Arc<RwLock<QuestionnaireState>>,
    list_requests: Arc<AtomicU64>,
    detail_requests: Arc<AtomicU64>,
}

/// Take the next request number from `counter`.
fn next_request(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::AcqRel) + 1
}

/// Whether `request` is still the latest one issued through `counter`.
fn is_latest(counter: &AtomicU64, request: u64) -> bool {
    counter.load(Ordering::Acquire) == request
}

impl QuestionnaireStore {
    /// Create the store.
    #[must_use]
    pub fn new(pipeline: HttpPipeline, session: SessionStore, config: &ClientConfig) -> Self {
        Self {
            pipeline,
            session,
            write_timeout: config.write_timeout,
            default_page_size: config.page_size,
            state: Arc::new(RwLock::new(QuestionnaireState {
                page_size: config.page_size,
                ..QuestionnaireState::default()
            })),
            list_requests: Arc::new(AtomicU64::new(0)),
            detail_requests: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Read the state.
    pub async fn state<R>(&self, read: impl FnOnce(&QuestionnaireState) -> R) -> R {
        read(&*self.state.read().await)
    }

    /// Copy of the state.
    pub async fn snapshot(&self) -> QuestionnaireState {
        self.state.read().await.clone()
    }

    /// Fetch one page of the list and keep the entries the session may see.
    ///
    /// On failure the list is emptied and the total reset to 0. When calls
    /// overlap, only the most recently started one writes the state; the
    /// others still return their own result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] on request failure.
    pub async fn fetch_list(&self, page: u32) -> Result<Vec<QuestionnaireSummary>, StoreError> {
        let session = self.session.snapshot();
        let ticket = next_request(&self.list_requests);
        let request = self
            .pipeline
            .request(Method::GET, "/questionnaire/list")
            .with_query("page", page)
            .with_query("user_id", session.user_id);

        let fetched = match self.pipeline.send(request).await {
            Ok(body) => envelope_data::<QuestionnairePage>(body),
            Err(error) => Err(error.into()),
        };

        let mut state = self.state.write().await;
        if !is_latest(&self.list_requests, ticket) {
            tracing::debug!(page, "Newer list request in flight, not updating state");
            return fetched.map(|data| {
                data.unwrap_or_default()
                    .questionnaires
                    .into_iter()
                    .filter(|entry| visible_to(&session, &entry.questionnaire))
                    .collect()
            });
        }
        match fetched {
            Ok(data) => {
                let data = data.unwrap_or_default();
                let received = data.questionnaires.len();
                let list: Vec<QuestionnaireSummary> = data
                    .questionnaires
                    .into_iter()
                    .filter(|entry| visible_to(&session, &entry.questionnaire))
                    .collect();

                state.total_count = data
                    .total
                    .filter(|total| *total > 0)
                    .unwrap_or_else(|| u64::try_from(list.len()).unwrap_or(u64::MAX));
                state.current_page = data.page.filter(|p| *p > 0).unwrap_or(page);
                state.page_size = data
                    .page_size
                    .filter(|size| *size > 0)
                    .unwrap_or(self.default_page_size);
                state.list.clone_from(&list);

                tracing::debug!(
                    page = state.current_page,
                    received,
                    visible = list.len(),
                    total = state.total_count,
                    "Questionnaire list fetched"
                );
                Ok(list)
            }
            Err(error) => {
                state.list.clear();
                state.total_count = 0;
                tracing::warn!(page, %error, "Failed to fetch questionnaire list");
                Err(error)
            }
        }
    }

    /// Fetch a questionnaire with its questions.
    ///
    /// On failure `current` is cleared. Overlapping calls are resolved like
    /// [`fetch_list`](Self::fetch_list).
    ///
    /// # Errors
    ///
    /// - [`StoreError::MalformedResponse`] if the body has no `data`
    /// - [`StoreError::Api`] on request failure
    pub async fn fetch_detail(&self, id: u64) -> Result<QuestionnaireDetail, StoreError> {
        let ticket = next_request(&self.detail_requests);
        let request = self
            .pipeline
            .request(Method::GET, "/questionnaire/detail")
            .with_query("id", id);

        let fetched = match self.pipeline.send(request).await {
            Ok(body) => required_data::<QuestionnaireDetail>(body, "questionnaire detail"),
            Err(error) => Err(error.into()),
        };

        let mut state = self.state.write().await;
        if !is_latest(&self.detail_requests, ticket) {
            tracing::debug!(id, "Newer detail request in flight, not updating state");
            return fetched;
        }
        match fetched {
            Ok(detail) => {
                state.current.clone_from(&detail.questionnaire);
                state.current_questions.clone_from(&detail.questions);
                Ok(detail)
            }
            Err(error) => {
                state.current = None;
                state.current_questions.clear();
                tracing::warn!(id, %error, "Failed to fetch questionnaire detail");
                Err(error)
            }
        }
    }

    /// Create a questionnaire. Questions are renumbered in order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] on request failure.
    pub async fn create(&self, draft: QuestionnaireDraft) -> Result<serde_json::Value, StoreError> {
        let body = encode(&draft.normalize())?;
        let request = self
            .pipeline
            .request(Method::POST, "/questionnaire/create")
            .with_body(body)
            .with_timeout(self.write_timeout);

        let response = self.pipeline.send(request).await?;
        tracing::info!("Questionnaire created");
        Ok(response)
    }

    /// Update a questionnaire. Questions are renumbered in order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] on request failure.
    pub async fn update(&self, draft: QuestionnaireDraft) -> Result<serde_json::Value, StoreError> {
        let id = draft.id;
        let body = encode(&draft.normalize())?;
        let request = self
            .pipeline
            .request(Method::PUT, "/questionnaire/update")
            .with_body(body)
            .with_timeout(self.write_timeout);

        let response = self.pipeline.send(request).await?;
        tracing::info!(?id, "Questionnaire updated");
        Ok(response)
    }

    /// Publish or unpublish.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] on request failure.
    pub async fn update_status(
        &self,
        id: u64,
        is_published: bool,
    ) -> Result<serde_json::Value, StoreError> {
        let request = self
            .pipeline
            .request(Method::PUT, "/questionnaire/update-status")
            .with_body(json!({ "id": id, "is_published": is_published }));

        let response = self.pipeline.send(request).await?;
        tracing::info!(id, is_published, "Questionnaire status updated");
        Ok(response)
    }

    /// Delete a questionnaire.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] on request failure.
    pub async fn delete(&self, id: u64) -> Result<serde_json::Value, StoreError> {
        let request = self
            .pipeline
            .request(Method::DELETE, "/questionnaire/delete")
            .with_query("id", id);

        let response = self.pipeline.send(request).await?;
        tracing::info!(id, "Questionnaire deleted");
        Ok(response)
    }

    /// Submit answers.
    ///
    /// Answers carrying only `content` get `answer_content` filled in.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadySubmitted`] on 409
    /// - [`StoreError::Api`] on any other failure
    pub async fn submit(&self, submission: AnswerSubmission) -> Result<serde_json::Value, StoreError> {
        let submission = submission.normalize();
        let questionnaire_id = submission.questionnaire_id;
        let request = self
            .pipeline
            .request(Method::POST, "/questionnaire/submit")
            .with_body(encode(&submission)?);

        match self.pipeline.send(request).await {
            Ok(response) => {
                tracing::info!(questionnaire_id, "Answers submitted");
                Ok(response)
            }
            Err(ApiError::Conflict { .. }) => {
                tracing::info!(questionnaire_id, "Questionnaire already answered");
                Err(StoreError::AlreadySubmitted)
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Fetch the results of a questionnaire as the current user.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotLoggedIn`] without a user id; nothing is sent
    /// - [`StoreError::MalformedResponse`] if the body has no `data`
    /// - [`StoreError::Api`] on request failure
    pub async fn results(&self, id: u64) -> Result<QuestionnaireResults, StoreError> {
        let user_id = self.session.user_id();
        if user_id == 0 {
            return Err(StoreError::NotLoggedIn);
        }

        let request = self
            .pipeline
            .request(Method::GET, "/questionnaire/results")
            .with_query("id", id)
            .with_query("user_id", user_id);

        let body = self.pipeline.send(request).await?;
        required_data(body, "questionnaire results")
    }

    /// Whether `user_id` already answered `questionnaire_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] on request failure.
    pub async fn check_submission(
        &self,
        questionnaire_id: u64,
        user_id: u64,
    ) -> Result<SubmissionCheck, StoreError> {
        let request = self
            .pipeline
            .request(Method::GET, "/questionnaire/check-submission")
            .with_query("questionnaire_id", questionnaire_id)
            .with_query("user_id", user_id);

        Ok(self.pipeline.send_json(request).await?)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Api(ApiError::Client(e.to_string())))
}
