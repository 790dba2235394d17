//! Navigation, invalidation and stale views over the test harness.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use questionnaire_app::{NavigationOutcome, Navigator, QuestionnaireApp};
use questionnaire_core::{Redirect, Route, RouteGuard, RouteTable};
use questionnaire_testing::{fixtures, init_test_tracing, TestHarness};
use std::time::Duration;

fn app(harness: &TestHarness) -> QuestionnaireApp {
    QuestionnaireApp::from_parts(&harness.config, harness.session.clone(), harness.pipeline.clone())
}

async fn wait_for_location(navigator: &Navigator, expected: &str) {
    let mut location = navigator.subscribe();
    tokio::time::timeout(Duration::from_secs(1), location.wait_for(|path| path == expected))
        .await
        .expect("location did not change in time")
        .unwrap();
}

#[tokio::test]
async fn anonymous_user_is_sent_to_login_from_protected_pages() {
    let harness = TestHarness::new();
    let navigator = Navigator::new(harness.session.clone());

    let outcome = navigator.navigate("/questionnaire/create");

    assert_eq!(
        outcome,
        NavigationOutcome::Redirected {
            from: "/questionnaire/create".to_string(),
            to: Redirect::Login,
        }
    );
    assert_eq!(navigator.current(), "/login");
}

#[tokio::test]
async fn regular_user_is_sent_home_from_admin_pages() {
    let harness = TestHarness::with_session(fixtures::alice());
    let navigator = Navigator::new(harness.session.clone());

    let outcome = navigator.navigate("/admin/statistics");

    assert_eq!(outcome.location(), "/");
    assert_eq!(navigator.current(), "/");
}

#[tokio::test]
async fn admin_reaches_admin_pages_with_route_params() {
    let harness = TestHarness::with_session(fixtures::admin());
    let navigator = Navigator::new(harness.session.clone());

    assert_eq!(navigator.navigate("/admin/users").location(), "/admin/users");

    match navigator.navigate("/questionnaire/results/5/question/2") {
        NavigationOutcome::Arrived { route: Some(route), .. } => {
            assert_eq!(route.route.name, "QuestionnaireQuestionResults");
            assert_eq!(route.param("id"), Some("5"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn unknown_paths_are_allowed_without_route() {
    let harness = TestHarness::new();
    let navigator = Navigator::new(harness.session.clone());

    assert_eq!(
        navigator.navigate("/about"),
        NavigationOutcome::Arrived {
            path: "/about".to_string(),
            route: None,
        }
    );
}

#[tokio::test]
async fn login_unlocks_protected_pages() {
    let harness = TestHarness::new();
    let app = app(&harness);

    assert_eq!(app.navigator.navigate("/questionnaire/edit/3").location(), "/login");

    harness.primary.push_json(200, fixtures::login_body("t1", 7, false));
    app.users.login("alice", "secret").await.unwrap();

    assert_eq!(
        app.navigator.navigate("/questionnaire/edit/3").location(),
        "/questionnaire/edit/3"
    );
}

#[tokio::test]
async fn rejected_session_returns_user_to_login() {
    init_test_tracing();
    let harness = TestHarness::with_session(fixtures::alice());
    let app = app(&harness);
    let listener = app.navigator.spawn_invalidation_listener();

    app.navigator.navigate("/questionnaire/results/4");
    harness.primary.push_json(401, fixtures::failure("token expired"));

    let err = app.questionnaires.results(4).await.unwrap_err();

    assert_eq!(err.to_string(), "token expired");
    wait_for_location(&app.navigator, "/login").await;
    assert!(!app.session.is_logged_in());

    listener.abort();
}

#[tokio::test]
async fn plain_logout_does_not_move_the_user() {
    let harness = TestHarness::with_session(fixtures::alice());
    let app = app(&harness);
    let listener = app.navigator.spawn_invalidation_listener();

    app.navigator.navigate("/questionnaire/list");
    app.users.logout().unwrap();
    tokio::task::yield_now().await;

    assert_eq!(app.navigator.current(), "/questionnaire/list");
    listener.abort();
}

#[tokio::test]
async fn listener_stops_when_session_store_is_dropped() {
    let listener = {
        let harness = TestHarness::new();
        let navigator = Navigator::new(harness.session.clone());
        navigator.spawn_invalidation_listener()
    };

    tokio::time::timeout(Duration::from_secs(1), listener)
        .await
        .expect("listener kept running")
        .unwrap();
}

#[tokio::test]
async fn result_for_abandoned_view_is_dropped() {
    let harness = TestHarness::with_session(fixtures::alice());
    let app = app(&harness);

    app.navigator.navigate("/questionnaire/detail/4");
    let scope = app.navigator.scope();
    harness.primary.push_json(200, fixtures::detail_body(4, 2));

    let pending = app.questionnaires.fetch_detail(4);
    app.navigator.navigate("/questionnaire/list");
    let detail = pending.await.unwrap();

    let mut shown = None;
    assert!(scope.apply(detail, |d| shown = Some(d.questions.len())).is_none());
    assert!(shown.is_none());

    let fresh = app.navigator.scope();
    assert_eq!(fresh.path(), "/questionnaire/list");
    assert!(fresh.is_current());
}

#[tokio::test]
async fn custom_route_table_metadata_drives_the_guard() {
    let harness = TestHarness::with_session(fixtures::alice());
    let routes = RouteTable::new(vec![
        Route {
            name: "Home",
            pattern: "/",
            requires_admin: false,
        },
        Route {
            name: "Reports",
            pattern: "/reports/:id",
            requires_admin: true,
        },
    ]);
    assert_eq!(routes.routes().len(), 2);
    let navigator = Navigator::with_routes(harness.session.clone(), routes, RouteGuard::default());

    assert_eq!(
        navigator.navigate("/reports/3"),
        NavigationOutcome::Redirected {
            from: "/reports/3".to_string(),
            to: Redirect::Home,
        }
    );
    assert_eq!(navigator.navigate("/").location(), "/");
}
