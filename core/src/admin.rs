//! Wire types of the `/api/admin` endpoints.

use crate::questionnaire::{Question, Questionnaire, Submission};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account as listed by the admin API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    /// User id.
    #[serde(default)]
    pub id: u64,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Administrator flag.
    #[serde(default)]
    pub is_admin: bool,
    /// Account creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `data` of `GET /api/admin/users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPage {
    /// Total number of users.
    #[serde(default)]
    pub total: u64,
    /// Page number.
    #[serde(default)]
    pub page: u32,
    /// Page size.
    #[serde(default)]
    pub page_size: u32,
    /// Users on this page.
    #[serde(default)]
    pub users: Vec<AdminUser>,
}

/// `data` of `GET /api/admin/user/detail`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetail {
    /// The account.
    #[serde(default)]
    pub user: AdminUser,
    /// Questionnaires created by the user.
    #[serde(default)]
    pub questionnaire_count: u64,
    /// Submissions made by the user.
    #[serde(default)]
    pub submission_count: u64,
}

/// Body of `PUT /api/admin/user/update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    /// Account to change.
    pub id: u64,
    /// New email address.
    pub email: String,
    /// New phone number.
    pub phone: String,
    /// New administrator flag.
    pub is_admin: bool,
}

/// An entry of `GET /api/admin/questionnaires`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminQuestionnaireEntry {
    /// The questionnaire.
    #[serde(default)]
    pub questionnaire: Questionnaire,
    /// Creator's username.
    #[serde(default)]
    pub creator_name: String,
    /// Number of submissions received.
    #[serde(default)]
    pub submission_count: u64,
    /// Number of questions.
    #[serde(default)]
    pub question_count: u64,
}

/// `data` of `GET /api/admin/questionnaires`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminQuestionnairePage {
    /// Total number of questionnaires.
    #[serde(default)]
    pub total: u64,
    /// Page number.
    #[serde(default)]
    pub page: u32,
    /// Page size.
    #[serde(default)]
    pub page_size: u32,
    /// Entries on this page.
    #[serde(default)]
    pub questionnaires: Vec<AdminQuestionnaireEntry>,
}

/// Submitting user as embedded in a submission detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionUser {
    /// User id.
    #[serde(default)]
    pub id: u64,
    /// Login name.
    #[serde(default)]
    pub username: String,
}

/// A stored answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAnswer {
    /// Answered question.
    #[serde(default)]
    pub question_id: u64,
    /// Answer text.
    #[serde(default)]
    pub content: String,
}

/// One submission with its user and answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionDetail {
    /// The submission record.
    #[serde(default)]
    pub submission: Submission,
    /// Who submitted it.
    #[serde(default)]
    pub user: SubmissionUser,
    /// The answers given.
    #[serde(default)]
    pub answers: Vec<StoredAnswer>,
}

/// `data` of `GET /api/admin/questionnaire/submissions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetails {
    /// The questionnaire.
    #[serde(default)]
    pub questionnaire: Questionnaire,
    /// Its questions.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Every submission received.
    #[serde(default)]
    pub submission_details: Vec<SubmissionDetail>,
}

/// User counters of the statistics endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    /// All accounts.
    #[serde(default)]
    pub total_users: u64,
    /// Administrator accounts.
    #[serde(default)]
    pub admin_users: u64,
    /// Non-administrator accounts.
    #[serde(default)]
    pub normal_users: u64,
}

/// Questionnaire counters of the statistics endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireStatistics {
    /// All questionnaires.
    #[serde(default)]
    pub total_questionnaires: u64,
    /// Published questionnaires.
    #[serde(default)]
    pub published_questionnaires: u64,
    /// Unpublished questionnaires.
    #[serde(default)]
    pub unpublished_questionnaires: u64,
    /// All questions.
    #[serde(default)]
    pub total_questions: u64,
}

/// Submission counters of the statistics endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionStatistics {
    /// All submissions.
    #[serde(default)]
    pub total_submissions: u64,
    /// All answers.
    #[serde(default)]
    pub total_answers: u64,
    /// Submissions of the recent window.
    #[serde(default)]
    pub recent_submissions: u64,
    /// Mean answers per submission. The backend divides by zero on an empty
    /// database and may send `null`, hence the option.
    #[serde(default)]
    pub average_answers_per_submission: Option<f64>,
}

/// `data` of `GET /api/admin/statistics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStatistics {
    /// User counters.
    #[serde(default)]
    pub user_statistics: UserStatistics,
    /// Questionnaire counters.
    #[serde(default)]
    pub questionnaire_statistics: QuestionnaireStatistics,
    /// Submission counters.
    #[serde(default)]
    pub submission_statistics: SubmissionStatistics,
}
