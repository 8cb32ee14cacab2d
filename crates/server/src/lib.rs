//! Bulk email alerting for the Climatrix SL climate prediction platform.
//!
//! Resolves opted-in recipients from the user directory, emails them an alert over SMTP one at
//! a time, and reports the outcome for every recipient.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::alerts::AlertMailer;
use crate::config::AppConfig;

pub mod alerts;
pub mod api;
pub mod config;
pub mod directory;
pub mod email_templates;
pub mod entity;
pub mod error;

/// Process-wide handles, built once in `main` and shared by every request.
#[derive(Clone)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub mailer: Arc<dyn AlertMailer>,
    pub config: Arc<AppConfig>,
}
