//! Static route table of the application.
//!
//! Route patterns use `:name` segments for parameters, e.g.
//! `/questionnaire/detail/:id`. Only the `requires_admin` metadata feeds the
//! guard; everything else is informational.

/// A named route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Route name.
    pub name: &'static str,
    /// Path pattern.
    pub pattern: &'static str,
    /// Route metadata: destination requires an administrator.
    pub requires_admin: bool,
}

impl Route {
    const fn open(name: &'static str, pattern: &'static str) -> Self {
        Self {
            name,
            pattern,
            requires_admin: false,
        }
    }

    const fn admin(name: &'static str, pattern: &'static str) -> Self {
        Self {
            name,
            pattern,
            requires_admin: true,
        }
    }

    /// Match `path` against this route's pattern.
    ///
    /// Returns the extracted parameters on success. A trailing slash on the
    /// path is ignored; query strings and fragments must already be stripped.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Vec<(&'static str, String)>> {
        let pattern_segments = segments(self.pattern);
        let path_segments = segments(path);

        if pattern_segments.len() != path_segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
            if let Some(name) = expected.strip_prefix(':') {
                if actual.is_empty() {
                    return None;
                }
                params.push((name, (*actual).to_string()));
            } else if expected != actual {
                return None;
            }
        }

        Some(params)
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The matching route.
    pub route: Route,
    /// Extracted `:name` parameters in pattern order.
    pub params: Vec<(&'static str, String)>,
}

impl RouteMatch {
    /// Look up a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The application's route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Path of the home page.
pub const HOME_PATH: &str = "/";

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            routes: vec![
                Route::open("Home", HOME_PATH),
                Route::open("Login", LOGIN_PATH),
                Route::open("Register", "/register"),
                Route::open("QuestionnaireList", "/questionnaire/list"),
                Route::open("QuestionnaireDetail", "/questionnaire/detail/:id"),
                Route::open("QuestionnaireFill", "/questionnaire/fill/:id"),
                Route::open("QuestionnaireCreate", "/questionnaire/create"),
                Route::open("QuestionnaireEdit", "/questionnaire/edit/:id"),
                Route::open("QuestionnaireResults", "/questionnaire/results/:id"),
                Route::open(
                    "QuestionnaireQuestionResults",
                    "/questionnaire/results/:id/question/:questionId",
                ),
                Route::admin("AdminDashboard", "/admin"),
                Route::admin("AdminUsers", "/admin/users"),
                Route::admin("AdminQuestionnaires", "/admin/questionnaires"),
                Route::admin("AdminStatistics", "/admin/statistics"),
            ],
        }
    }
}

impl RouteTable {
    /// Build a table from explicit routes.
    #[must_use]
    pub const fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// All routes in declaration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the first route matching `path`.
    ///
    /// The query string and fragment are ignored.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = strip_query(path);
        self.routes.iter().find_map(|route| {
            route.matches(path).map(|params| RouteMatch {
                route: route.clone(),
                params,
            })
        })
    }
}

/// Drop `?query` and `#fragment` from a path.
#[must_use]
pub fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}
