//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use climatrix_alerts::AppResources;
use climatrix_alerts::alerts::{AlertEmail, AlertMailer, MailDeliveryError};
use climatrix_alerts::api::auth::AccessClaims;
use climatrix_alerts::config::{AlertsConfig, AppConfig, SmtpConfig};
use climatrix_alerts::entity::user::{self, Role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    Statement,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

pub const JWT_SECRET: &str = "test-secret-test-secret-test-secret!";

/// In-memory SQLite database with the `users` table.
pub async fn setup_test_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TABLE users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'Client',
            email_alerts_enabled BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NULL
        );"#,
    ))
    .await
    .expect("Failed to create users table");

    Arc::new(db)
}

/// In-memory database without any tables, so every directory query fails.
pub async fn broken_db() -> Arc<DatabaseConnection> {
    Arc::new(
        Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database"),
    )
}

pub async fn insert_account(
    db: &DatabaseConnection,
    user_id: i32,
    role: Role,
    email_alerts_enabled: bool,
) -> user::Model {
    user::ActiveModel {
        user_id: Set(user_id),
        name: Set(format!("User {user_id}")),
        email: Set(format!("user{user_id}@example.com")),
        role: Set(role),
        email_alerts_enabled: Set(email_alerts_enabled),
        created_at: Set(OffsetDateTime::now_utc()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert account")
}

/// Records every send attempt in order; rejects addresses in `failing`.
#[derive(Default)]
pub struct RecordingMailer {
    attempts: Mutex<Vec<AlertEmail>>,
    failing: HashSet<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attempts: Mutex::new(Vec::new()),
            failing: addresses.into_iter().map(Into::into).collect(),
        }
    }

    pub fn attempts(&self) -> Vec<AlertEmail> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempted_addresses(&self) -> Vec<String> {
        self.attempts().into_iter().map(|e| e.to).collect()
    }
}

#[async_trait]
impl AlertMailer for RecordingMailer {
    async fn send_alert(&self, email: &AlertEmail) -> Result<(), MailDeliveryError> {
        self.attempts.lock().unwrap().push(email.clone());
        if self.failing.contains(&email.to) {
            let source = "rejected-by-relay"
                .parse::<lettre::Address>()
                .expect_err("not an address");
            return Err(MailDeliveryError::InvalidAddress {
                address: email.to.clone(),
                source,
            });
        }
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        bind_address: "127.0.0.1:0".into(),
        jwt_secret: JWT_SECRET.into(),
        smtp: SmtpConfig {
            server: "localhost".into(),
            port: 25,
            username: "test".into(),
            password: "test".into(),
            from: "alerts@climatrix.example".into(),
        },
        alerts: AlertsConfig::default(),
    }
}

pub fn test_resources(db: Arc<DatabaseConnection>, mailer: Arc<RecordingMailer>) -> AppResources {
    AppResources {
        db,
        mailer,
        config: Arc::new(test_config()),
    }
}

pub fn bearer(user_id: i32, role: Role) -> String {
    AccessClaims::new(user_id, role, time::Duration::hours(1))
        .issue(JWT_SECRET)
        .expect("Failed to sign token")
}

pub fn email_of(user_id: i32) -> String {
    format!("user{user_id}@example.com")
}
