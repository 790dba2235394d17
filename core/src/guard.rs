//! Route authorization guard.
//!
//! Every navigation attempt is classified into two independent gates:
//!
//! - `requires_admin`: route metadata says so, or the path starts with one of
//!   the admin prefixes
//! - `requires_auth`: the path starts with one of the auth prefixes
//!
//! The admin gate is always evaluated first:
//!
//! | admin gate | token | admin | auth gate | outcome |
//! |---|---|---|---|---|
//! | yes | no  | –   | – | redirect to login |
//! | yes | yes | no  | – | redirect to home |
//! | yes | yes | yes | – | allow |
//! | no  | no  | –   | yes | redirect to login |
//! | no  | yes | –   | yes | allow |
//! | no  | –   | –   | no  | allow |

use crate::routes::{strip_query, HOME_PATH, LOGIN_PATH};
use crate::session::Session;

/// Path prefixes that require a logged-in user.
pub const AUTH_PREFIXES: [&str; 3] = [
    "/questionnaire/create",
    "/questionnaire/edit",
    "/questionnaire/results",
];

/// Path prefixes that require an administrator.
pub const ADMIN_PREFIXES: [&str; 4] = [
    "/admin",
    "/admin/users",
    "/admin/questionnaires",
    "/admin/statistics",
];

/// A navigation attempt, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Destination path as requested.
    pub target_path: String,
    /// Destination needs a token.
    pub requires_auth: bool,
    /// Destination needs an administrator.
    pub requires_admin: bool,
}

/// Where a refused navigation is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// The login page.
    Login,
    /// The home page (authenticated but not allowed).
    Home,
}

impl Redirect {
    /// Target path of the redirect.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Home => HOME_PATH,
        }
    }
}

/// Outcome of a guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation proceeds.
    Allow,
    /// Navigation is replaced by a redirect.
    Redirect(Redirect),
}

/// The guard, configured with its two prefix lists.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    auth_prefixes: Vec<String>,
    admin_prefixes: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(AUTH_PREFIXES, ADMIN_PREFIXES)
    }
}

impl RouteGuard {
    /// Create a guard with custom prefix lists.
    #[must_use]
    pub fn new<A, B>(auth_prefixes: A, admin_prefixes: B) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            auth_prefixes: auth_prefixes.into_iter().map(Into::into).collect(),
            admin_prefixes: admin_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Classify a destination.
    ///
    /// `route_requires_admin` is the destination route's metadata (false for
    /// unknown paths).
    #[must_use]
    pub fn classify(&self, target_path: &str, route_requires_admin: bool) -> NavigationRequest {
        let path = strip_query(target_path);

        NavigationRequest {
            target_path: target_path.to_string(),
            requires_auth: has_prefix(path, &self.auth_prefixes),
            requires_admin: route_requires_admin || has_prefix(path, &self.admin_prefixes),
        }
    }

    /// Decide whether `session` may reach the classified destination.
    #[must_use]
    pub fn decide(&self, request: &NavigationRequest, session: &Session) -> GuardDecision {
        let decision = if request.requires_admin {
            if !session.is_logged_in() {
                GuardDecision::Redirect(Redirect::Login)
            } else if !session.is_admin() {
                GuardDecision::Redirect(Redirect::Home)
            } else {
                GuardDecision::Allow
            }
        } else if request.requires_auth && !session.is_logged_in() {
            GuardDecision::Redirect(Redirect::Login)
        } else {
            GuardDecision::Allow
        };

        tracing::debug!(
            target_path = %request.target_path,
            requires_admin = request.requires_admin,
            requires_auth = request.requires_auth,
            logged_in = session.is_logged_in(),
            ?decision,
            "Route guard decision"
        );

        decision
    }
}

fn has_prefix(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user(is_admin: bool) -> Session {
        Session {
            token: "tok".to_string(),
            user_id: 1,
            is_admin,
            ..Session::default()
        }
    }

    #[test]
    fn test_decision_table() {
        let guard = RouteGuard::default();
        let admin_page = guard.classify("/admin/users", true);
        let auth_page = guard.classify("/questionnaire/create", false);
        let open_page = guard.classify("/questionnaire/list", false);

        let anonymous = Session::default();
        let member = user(false);
        let admin = user(true);

        assert_eq!(guard.decide(&admin_page, &anonymous), GuardDecision::Redirect(Redirect::Login));
        assert_eq!(guard.decide(&admin_page, &member), GuardDecision::Redirect(Redirect::Home));
        assert_eq!(guard.decide(&admin_page, &admin), GuardDecision::Allow);

        assert_eq!(guard.decide(&auth_page, &anonymous), GuardDecision::Redirect(Redirect::Login));
        assert_eq!(guard.decide(&auth_page, &member), GuardDecision::Allow);

        assert_eq!(guard.decide(&open_page, &anonymous), GuardDecision::Allow);
    }

    #[test]
    fn test_admin_prefix_without_metadata() {
        let guard = RouteGuard::default();
        let request = guard.classify("/admin/questionnaires?page=2", false);
        assert!(request.requires_admin);
        assert!(!request.requires_auth);
    }

    #[test]
    fn test_results_prefix_requires_auth() {
        let guard = RouteGuard::default();
        let request = guard.classify("/questionnaire/results/3/question/1", false);
        assert!(request.requires_auth);
        assert_eq!(
            guard.decide(&request, &Session::default()),
            GuardDecision::Redirect(Redirect::Login)
        );
    }

    #[test]
    fn test_redirect_paths() {
        assert_eq!(Redirect::Login.path(), "/login");
        assert_eq!(Redirect::Home.path(), "/");
    }

    proptest! {
        #[test]
        fn prop_admin_gate_without_token_always_redirects_to_login(
            requires_auth in any::<bool>(),
            stored_admin_flag in any::<bool>(),
            user_id in any::<u64>(),
            suffix in "[a-z/]{0,12}",
        ) {
            let guard = RouteGuard::default();
            let request = NavigationRequest {
                target_path: format!("/admin{suffix}"),
                requires_auth,
                requires_admin: true,
            };
            let session = Session {
                token: String::new(),
                user_id,
                is_admin: stored_admin_flag,
                ..Session::default()
            };

            prop_assert_eq!(
                guard.decide(&request, &session),
                GuardDecision::Redirect(Redirect::Login)
            );
        }

        #[test]
        fn prop_unguarded_paths_always_allow(
            token in "[a-z0-9]{0,8}",
            is_admin in any::<bool>(),
        ) {
            let guard = RouteGuard::default();
            let request = guard.classify("/questionnaire/list", false);
            let session = Session { token, is_admin, ..Session::default() };

            prop_assert_eq!(guard.decide(&request, &session), GuardDecision::Allow);
        }
    }
}
