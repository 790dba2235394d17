//! Questionnaire, question and answer wire types.

use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A questionnaire as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    /// Questionnaire id.
    #[serde(default)]
    pub id: u64,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Id of the creating user.
    #[serde(default)]
    pub created_by: u64,
    /// Opening time.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Closing time.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Whether the questionnaire is visible to everyone.
    #[serde(default)]
    pub is_published: bool,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A question belonging to a questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question id.
    #[serde(default)]
    pub id: u64,
    /// Owning questionnaire.
    #[serde(default)]
    pub questionnaire_id: u64,
    /// Prompt text.
    #[serde(default)]
    pub title: String,
    /// Question kind (single choice, multiple choice, text, rating...).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Whether an answer is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Choice options, JSON-encoded by the backend.
    #[serde(default)]
    pub options: String,
    /// Display position.
    #[serde(default)]
    pub sort: i64,
}

/// A list entry: the questionnaire plus the creator's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionnaireSummary {
    /// The questionnaire.
    pub questionnaire: Questionnaire,
    /// Creator's username, when the server includes it.
    pub creator_name: Option<String>,
}

/// The `{questionnaire, creator_name}` list entry shape.
#[derive(Deserialize)]
struct WrappedSummary {
    questionnaire: Questionnaire,
    #[serde(default)]
    creator_name: Option<String>,
}

/// Accepts both `{questionnaire, creator_name}` and a bare questionnaire.
///
/// An entry carrying a `questionnaire` key is only ever decoded as the
/// wrapped shape, so a bad inner field is an error.
impl<'de> Deserialize<'de> for QuestionnaireSummary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("questionnaire").is_some() {
            let wrapped: WrappedSummary = serde_json::from_value(value).map_err(D::Error::custom)?;
            Ok(Self {
                questionnaire: wrapped.questionnaire,
                creator_name: wrapped.creator_name,
            })
        } else {
            let questionnaire = serde_json::from_value(value).map_err(D::Error::custom)?;
            Ok(Self {
                questionnaire,
                creator_name: None,
            })
        }
    }
}

/// `data` of `GET /api/questionnaire/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionnairePage {
    /// Entries of the requested page.
    #[serde(default)]
    pub questionnaires: Vec<QuestionnaireSummary>,
    /// Total number of entries on the server.
    #[serde(default)]
    pub total: Option<u64>,
    /// Page number echoed by the server.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size echoed by the server.
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// `data` of `GET /api/questionnaire/detail`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireDetail {
    /// The questionnaire, absent if the server sent none.
    #[serde(default)]
    pub questionnaire: Option<Questionnaire>,
    /// Its questions.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A question inside a create/update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    /// Existing question id (updates only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Prompt text.
    pub title: String,
    /// Question kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether an answer is mandatory.
    #[serde(default)]
    pub required: bool,
    /// JSON-encoded choice options.
    #[serde(default)]
    pub options: String,
    /// Display position, rewritten by [`QuestionnaireDraft::normalize`].
    #[serde(default)]
    pub sort: i64,
}

/// Body of `POST /api/questionnaire/create` and `PUT /api/questionnaire/update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireDraft {
    /// Id of the questionnaire being updated; `None` when creating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Creator's user id.
    #[serde(default)]
    pub created_by: u64,
    /// Opening time, serialised as RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Closing time, serialised as RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Publish immediately.
    #[serde(default)]
    pub is_published: bool,
    /// Questions in display order.
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

impl QuestionnaireDraft {
    /// Renumber `sort` so that it matches each question's position.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        for (index, question) in self.questions.iter_mut().enumerate() {
            question.sort = i64::try_from(index).unwrap_or(i64::MAX);
        }
        self
    }
}

/// One answer inside a submission.
///
/// Callers may fill either `content` or `answer_content`; the backend reads
/// `answer_content`. [`AnswerSubmission::normalize`] copies one into the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerInput {
    /// Answered question.
    pub question_id: u64,
    /// Answer text as entered in a form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Answer text in the field name the backend expects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_content: Option<String>,
}

/// Body of `POST /api/questionnaire/submit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    /// Target questionnaire.
    pub questionnaire_id: u64,
    /// Submitting user.
    pub user_id: u64,
    /// Answers.
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

impl AnswerSubmission {
    /// Fill `answer_content` from `content` wherever only `content` is set.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        for answer in &mut self.answers {
            if answer.answer_content.is_none() {
                answer.answer_content.clone_from(&answer.content);
            }
        }
        self
    }
}

/// A stored submission record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Submission id.
    #[serde(default)]
    pub id: u64,
    /// Questionnaire that was answered.
    #[serde(default)]
    pub questionnaire_id: u64,
    /// Submitting user.
    #[serde(default)]
    pub user_id: u64,
    /// Submission time.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Client address recorded by the server.
    #[serde(default)]
    pub ip_address: String,
}

/// Response of `GET /api/questionnaire/check-submission` (not enveloped).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionCheck {
    /// Whether the user already answered.
    #[serde(default)]
    pub has_submitted: bool,
    /// The existing submission, if any.
    #[serde(default)]
    pub submission: Option<Submission>,
}

/// An answer inside a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultAnswer {
    /// Answer id.
    #[serde(default)]
    pub id: u64,
    /// Answered question.
    #[serde(default)]
    pub question_id: u64,
    /// Answer text.
    #[serde(default)]
    pub content: String,
    /// Storage time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Who answered, as far as results reveal it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultUser {
    /// Login name.
    #[serde(default)]
    pub username: String,
}

/// One submission and its answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSubmission {
    /// The submission record.
    #[serde(default)]
    pub submission: Submission,
    /// Its answers.
    #[serde(default)]
    pub answers: Vec<ResultAnswer>,
    /// The submitting user.
    #[serde(default)]
    pub user_info: ResultUser,
}

/// `data` of `GET /api/questionnaire/results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireResults {
    /// The questionnaire.
    #[serde(default)]
    pub questionnaire: Questionnaire,
    /// Its questions.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Every submission received.
    #[serde(default)]
    pub submissions: Vec<ResultSubmission>,
    /// Number of submissions.
    #[serde(default)]
    pub total_submissions: u64,
}

impl QuestionnaireResults {
    /// Answers given to one question across all submissions.
    pub fn answers_for(&self, question_id: u64) -> impl Iterator<Item = &ResultAnswer> {
        self.submissions
            .iter()
            .flat_map(|submission| submission.answers.iter())
            .filter(move |answer| answer.question_id == question_id)
    }
}

/// Client-side visibility rule applied to every fetched list.
///
/// - administrators see everything
/// - logged-in users see published questionnaires and their own drafts
/// - anonymous visitors see published questionnaires only
///
/// This runs regardless of what the server already filtered.
#[must_use]
pub fn visible_to(session: &Session, questionnaire: &Questionnaire) -> bool {
    if session.is_admin() {
        return true;
    }

    if session.is_logged_in() && session.user_id > 0 {
        return questionnaire.is_published || questionnaire.created_by == session.user_id;
    }

    questionnaire.is_published
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn questionnaire(created_by: u64, is_published: bool) -> Questionnaire {
        Questionnaire {
            id: 1,
            created_by,
            is_published,
            ..Questionnaire::default()
        }
    }

    fn session(user_id: u64, is_admin: bool) -> Session {
        Session {
            token: "t".to_string(),
            user_id,
            is_admin,
            ..Session::default()
        }
    }

    #[test]
    fn test_visibility_rules() {
        let draft_by_7 = questionnaire(7, false);
        let published = questionnaire(9, true);

        assert!(visible_to(&session(1, true), &draft_by_7));
        assert!(visible_to(&session(7, false), &draft_by_7));
        assert!(!visible_to(&session(8, false), &draft_by_7));
        assert!(visible_to(&session(8, false), &published));
        assert!(!visible_to(&Session::default(), &draft_by_7));
        assert!(visible_to(&Session::default(), &published));
    }

    #[test]
    fn test_stale_admin_flag_without_token_is_ignored() {
        let stale = Session {
            is_admin: true,
            user_id: 7,
            ..Session::default()
        };

        assert!(!visible_to(&stale, &questionnaire(7, false)));
    }

    #[test]
    fn test_summary_accepts_wrapped_and_bare_entries() {
        let page: QuestionnairePage = serde_json::from_value(json!({
            "questionnaires": [
                {"questionnaire": {"id": 1, "title": "A", "is_published": true}, "creator_name": "alice"},
                {"id": 2, "title": "B", "created_by": 4}
            ],
            "total": 2
        }))
        .unwrap();

        assert_eq!(page.questionnaires.len(), 2);
        assert_eq!(page.questionnaires[0].creator_name.as_deref(), Some("alice"));
        assert_eq!(page.questionnaires[0].questionnaire.id, 1);
        assert_eq!(page.questionnaires[1].questionnaire.created_by, 4);
        assert_eq!(page.questionnaires[1].creator_name, None);
        assert_eq!(page.page, None);
    }

    #[test]
    fn test_wrapped_entry_with_bad_inner_field_is_an_error() {
        let result: Result<QuestionnairePage, _> = serde_json::from_value(json!({
            "questionnaires": [{
                "questionnaire": {
                    "id": 5,
                    "title": "Real",
                    "is_published": true,
                    "start_time": "2025-01-01 10:00:00"
                },
                "creator_name": "bob"
            }]
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_go_zero_time_is_accepted() {
        let q: Questionnaire = serde_json::from_value(json!({
            "id": 3,
            "start_time": "0001-01-01T00:00:00Z",
            "end_time": "2025-06-01T08:00:00+08:00"
        }))
        .unwrap();

        assert!(q.start_time.is_some());
        assert_eq!(q.end_time.unwrap().to_rfc3339(), "2025-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_draft_normalize_renumbers_questions() {
        let draft = QuestionnaireDraft {
            title: "Survey".to_string(),
            questions: vec![
                QuestionDraft { title: "a".to_string(), sort: 9, ..QuestionDraft::default() },
                QuestionDraft { title: "b".to_string(), sort: 9, ..QuestionDraft::default() },
            ],
            ..QuestionnaireDraft::default()
        }
        .normalize();

        let sorts: Vec<i64> = draft.questions.iter().map(|q| q.sort).collect();
        assert_eq!(sorts, vec![0, 1]);
    }

    #[test]
    fn test_results_answers_for_question() {
        let results: QuestionnaireResults = serde_json::from_value(json!({
            "questionnaire": {"id": 5, "title": "Lunch"},
            "questions": [{"id": 1, "type": "text"}, {"id": 2, "type": "rating"}],
            "submissions": [
                {"submission": {"id": 1}, "answers": [{"question_id": 1, "content": "soup"}, {"question_id": 2, "content": "4"}], "user_info": {"username": "alice"}},
                {"submission": {"id": 2}, "answers": [{"question_id": 1, "content": "salad"}]}
            ],
            "total_submissions": 2
        }))
        .unwrap();

        let texts: Vec<&str> = results.answers_for(1).map(|a| a.content.as_str()).collect();
        assert_eq!(texts, vec!["soup", "salad"]);
        assert_eq!(results.questions[1].kind, "rating");
        assert_eq!(results.submissions[1].user_info, ResultUser::default());
    }

    #[test]
    fn test_answer_normalize_prefers_existing_answer_content() {
        let submission = AnswerSubmission {
            questionnaire_id: 1,
            user_id: 2,
            answers: vec![
                AnswerInput {
                    question_id: 1,
                    content: Some("yes".to_string()),
                    answer_content: None,
                },
                AnswerInput {
                    question_id: 2,
                    content: Some("ignored".to_string()),
                    answer_content: Some("kept".to_string()),
                },
            ],
        }
        .normalize();

        assert_eq!(submission.answers[0].answer_content.as_deref(), Some("yes"));
        assert_eq!(submission.answers[1].answer_content.as_deref(), Some("kept"));
    }
}
