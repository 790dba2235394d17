//! Questionnaire demo client.
//!
//! Restores the persisted session, optionally logs in with
//! `QUESTIONNAIRE_USERNAME` / `QUESTIONNAIRE_PASSWORD`, then lists the first
//! page of questionnaires visible to the user.

use anyhow::{Context, Result};
use questionnaire_app::telemetry::init_tracing;
use questionnaire_app::{AppConfig, NavigationOutcome, QuestionnaireApp};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_tracing();

    tracing::info!(api_url = %config.api_url, "Starting questionnaire client");

    let app = QuestionnaireApp::from_config(&config).context("Failed to initialise application")?;
    let listener = app.navigator.spawn_invalidation_listener();

    if let Some(login) = app.sign_in(&config).await.context("Login failed")? {
        tracing::info!(user_id = login.user_id, is_admin = login.is_admin, "Logged in");
    }

    let target = if app.session.is_admin() {
        "/admin/questionnaires"
    } else {
        "/questionnaire/list"
    };
    if let NavigationOutcome::Redirected { from, to } = app.navigator.navigate(target) {
        tracing::warn!(%from, to = to.path(), "Navigation refused");
    }

    let scope = app.navigator.scope();
    match app.questionnaires.fetch_list(1).await {
        Ok(list) => {
            scope.apply(list, |list| {
                for entry in &list {
                    println!(
                        "#{:<4} {:<40} {}",
                        entry.questionnaire.id,
                        entry.questionnaire.title,
                        if entry.questionnaire.is_published { "published" } else { "draft" }
                    );
                }
            });
            let total = app.questionnaires.state(|s| s.total_count).await;
            println!("{total} questionnaire(s) in total");
        }
        Err(error) => tracing::error!(%error, "Failed to fetch questionnaires"),
    }

    tracing::info!(location = %app.navigator.current(), "Done");
    listener.abort();
    Ok(())
}
