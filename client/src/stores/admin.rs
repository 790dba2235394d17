//! Administration endpoints under `/admin`.
//!
//! These go through the same pipeline as every other call, so the bearer
//! token and the 401/403 invalidation apply unchanged. The server decides
//! whether the caller is an administrator.

use super::required_data;
use crate::error::{ApiError, StoreError};
use crate::pipeline::HttpPipeline;
use http::Method;
use questionnaire_core::admin::{
    AdminQuestionnairePage, SubmissionDetails, SystemStatistics, UserDetail, UserPage, UserUpdate,
};

/// Administration operations. Holds no state.
#[derive(Debug, Clone)]
pub struct AdminStore {
    pipeline: HttpPipeline,
}

impl AdminStore {
    /// Create the store.
    #[must_use]
    pub const fn new(pipeline: HttpPipeline) -> Self {
        Self { pipeline }
    }

    /// List users.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on request failure or a body without `data`.
    pub async fn users(&self, page: u32, page_size: u32) -> Result<UserPage, StoreError> {
        let request = self
            .pipeline
            .request(Method::GET, "/admin/users")
            .with_query("page", page)
            .with_query("page_size", page_size);

        let body = self.pipeline.send(request).await?;
        required_data(body, "user list")
    }

    /// One user with their activity counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on request failure or a body without `data`.
    pub async fn user_detail(&self, id: u64) -> Result<UserDetail, StoreError> {
        let request = self
            .pipeline
            .request(Method::GET, "/admin/user/detail")
            .with_query("id", id);

        let body = self.pipeline.send(request).await?;
        required_data(body, "user detail")
    }

    /// Change a user's email, phone or role.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] on request failure.
    pub async fn update_user(&self, update: &UserUpdate) -> Result<serde_json::Value, StoreError> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Client(e.to_string()))?;
        let request = self
            .pipeline
            .request(Method::PUT, "/admin/user/update")
            .with_body(body);

        let response = self.pipeline.send(request).await?;
        tracing::info!(user_id = update.id, is_admin = update.is_admin, "User updated");
        Ok(response)
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] on request failure.
    pub async fn delete_user(&self, id: u64) -> Result<serde_json::Value, StoreError> {
        let request = self
            .pipeline
            .request(Method::DELETE, "/admin/user/delete")
            .with_query("id", id);

        let response = self.pipeline.send(request).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(response)
    }

    /// List every questionnaire with its counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on request failure or a body without `data`.
    pub async fn questionnaires(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<AdminQuestionnairePage, StoreError> {
        let request = self
            .pipeline
            .request(Method::GET, "/admin/questionnaires")
            .with_query("page", page)
            .with_query("page_size", page_size);

        let body = self.pipeline.send(request).await?;
        required_data(body, "questionnaire list")
    }

    /// Every submission of a questionnaire, with answers and users.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on request failure or a body without `data`.
    pub async fn questionnaire_submissions(&self, id: u64) -> Result<SubmissionDetails, StoreError> {
        let request = self
            .pipeline
            .request(Method::GET, "/admin/questionnaire/submissions")
            .with_query("id", id);

        let body = self.pipeline.send(request).await?;
        required_data(body, "questionnaire submissions")
    }

    /// System-wide counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on request failure or a body without `data`.
    pub async fn statistics(&self) -> Result<SystemStatistics, StoreError> {
        let request = self.pipeline.request(Method::GET, "/admin/statistics");
        let body = self.pipeline.send(request).await?;
        required_data(body, "statistics")
    }
}
