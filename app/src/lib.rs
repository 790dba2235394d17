//! # Questionnaire App
//!
//! The application shell around the questionnaire client, without rendering:
//!
//! - [`config::AppConfig`]: environment configuration
//! - [`bootstrap::QuestionnaireApp`]: session, pipeline and stores wired together
//! - [`navigator::Navigator`]: current location, route guard and the
//!   invalidation listener that returns the user to the login page
//! - [`view::ViewScope`]: drops results that arrive after the user navigated away
//!
//! ## Example
//!
//! ```no_run
//! use questionnaire_app::{AppConfig, QuestionnaireApp};
//!
//! # async fn example() -> Result<(), questionnaire_app::AppError> {
//! let config = AppConfig::from_env();
//! let app = QuestionnaireApp::from_config(&config)?;
//! let _listener = app.navigator.spawn_invalidation_listener();
//!
//! app.navigator.navigate("/questionnaire/list");
//! let scope = app.navigator.scope();
//! let list = app.questionnaires.fetch_list(1).await?;
//! scope.apply(list, |list| println!("{} questionnaires", list.len()));
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod navigator;
pub mod telemetry;
pub mod view;

pub use bootstrap::QuestionnaireApp;
pub use config::{AppConfig, Credentials};
pub use error::AppError;
pub use navigator::{NavigationOutcome, Navigator};
pub use view::ViewScope;
