//! # Questionnaire Testing
//!
//! Test helpers for the questionnaire client.
//!
//! This crate provides:
//! - Canned backend bodies and sessions ([`fixtures`])
//! - A fully wired client over scripted transports ([`TestHarness`])
//! - proptest strategies for sessions and paths ([`properties`])
//!
//! ## Example
//!
//! ```
//! use questionnaire_testing::{fixtures, TestHarness};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let harness = TestHarness::new();
//! harness.primary.push_json(200, fixtures::login_body("t1", 7, false));
//!
//! harness.users.login("alice", "secret").await.unwrap();
//! assert_eq!(harness.session.token(), "t1");
//! # }
//! ```

pub mod harness;

/// Canned backend bodies and sessions.
pub mod fixtures {
    use chrono::{DateTime, Utc};
    use questionnaire_core::Session;
    use serde_json::{json, Value};

    /// Fixed timestamp for deterministic bodies (2025-01-01 00:00:00 UTC).
    #[must_use]
    pub fn test_time() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089)
    }

    /// A logged-in regular user: `alice`, id 7, token `t1`.
    #[must_use]
    pub fn alice() -> Session {
        Session {
            token: "t1".to_string(),
            user_id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            is_admin: false,
        }
    }

    /// A logged-in administrator: `root`, id 1, token `admin-token`.
    #[must_use]
    pub fn admin() -> Session {
        Session {
            token: "admin-token".to_string(),
            user_id: 1,
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            is_admin: true,
        }
    }

    /// Body of a successful login.
    #[must_use]
    pub fn login_body(token: &str, user_id: u64, is_admin: bool) -> Value {
        json!({
            "success": true,
            "message": "login ok",
            "token": token,
            "user_id": user_id,
            "username": "alice",
            "email": "alice@example.com",
            "is_admin": is_admin
        })
    }

    /// `{success: true, data}`.
    #[must_use]
    pub fn envelope(data: Value) -> Value {
        json!({ "success": true, "data": data })
    }

    /// `{success: false, message}`.
    #[must_use]
    pub fn failure(message: &str) -> Value {
        json!({ "success": false, "message": message })
    }

    /// A questionnaire object.
    #[must_use]
    pub fn questionnaire(id: u64, created_by: u64, is_published: bool) -> Value {
        json!({
            "id": id,
            "title": format!("Questionnaire {id}"),
            "description": "",
            "created_by": created_by,
            "is_published": is_published,
            "created_at": test_time().to_rfc3339(),
            "updated_at": test_time().to_rfc3339()
        })
    }

    /// A list body with wrapped entries, as the backend sends it.
    #[must_use]
    pub fn list_body(entries: &[(u64, u64, bool)]) -> Value {
        let questionnaires: Vec<Value> = entries
            .iter()
            .map(|&(id, created_by, is_published)| {
                json!({
                    "questionnaire": questionnaire(id, created_by, is_published),
                    "creator_name": format!("user{created_by}")
                })
            })
            .collect();
        envelope(json!({ "questionnaires": questionnaires }))
    }

    /// A detail body with `questions` text questions.
    #[must_use]
    pub fn detail_body(id: u64, questions: u64) -> Value {
        let questions: Vec<Value> = (1..=questions)
            .map(|n| {
                json!({
                    "id": n,
                    "questionnaire_id": id,
                    "title": format!("Question {n}"),
                    "type": "text",
                    "required": true,
                    "sort": n - 1
                })
            })
            .collect();
        envelope(json!({
            "questionnaire": questionnaire(id, 7, true),
            "questions": questions
        }))
    }
}

/// proptest strategies.
pub mod properties {
    use proptest::prelude::*;
    use questionnaire_core::Session;

    /// Any session, anonymous or not, with any stored role flag.
    pub fn arb_session() -> impl Strategy<Value = Session> {
        ("[a-z0-9]{0,12}", 0_u64..1000, any::<bool>()).prop_map(|(token, user_id, is_admin)| {
            Session {
                token,
                user_id,
                is_admin,
                ..Session::default()
            }
        })
    }

    /// A session without a token; the role flag may still be set.
    pub fn arb_anonymous_session() -> impl Strategy<Value = Session> {
        (0_u64..1000, any::<bool>()).prop_map(|(user_id, is_admin)| Session {
            user_id,
            is_admin,
            ..Session::default()
        })
    }

    /// Paths under the admin area.
    pub fn arb_admin_path() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("/admin".to_string()),
            Just("/admin/users".to_string()),
            Just("/admin/questionnaires".to_string()),
            Just("/admin/statistics".to_string()),
            "[a-z]{1,8}".prop_map(|tail| format!("/admin/{tail}")),
        ]
    }
}

/// Install a test subscriber once; later calls do nothing.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use harness::TestHarness;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_time() {
        assert_eq!(fixtures::test_time().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_list_body_shape() {
        let body = fixtures::list_body(&[(1, 7, false)]);
        assert_eq!(body["data"]["questionnaires"][0]["questionnaire"]["created_by"], 7);
        assert_eq!(body["data"]["questionnaires"][0]["creator_name"], "user7");
    }
}
