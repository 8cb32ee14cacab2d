//! Bulk email alerting.
//!
//! One batch runs `validating -> resolving -> dispatching -> reporting`. Validation and
//! resolution failures reject the whole batch before any email is sent; delivery failures are
//! recorded per recipient and never abort the batch. Nothing is persisted and a failed batch is
//! re-submitted in full by the caller.
//!
//! ## Submodules
//!
//! - `request` - Body parsing and validation
//! - `targeting` - Targeting modes and recipient resolution
//! - `mailer` - Single-recipient delivery over SMTP
//! - `dispatch` - Per-recipient send loop and report

pub mod dispatch;
pub mod mailer;
pub mod request;
pub mod targeting;

pub use dispatch::{DeliveryStatus, DispatchReport, RecipientResult, dispatch};
pub use mailer::{
    AlertEmail, AlertMailer, InlineLogo, MailDeliveryError, SmtpAlertMailer, default_subject,
};
pub use request::{AlertContent, AlertRequest, DEFAULT_ALERT_TYPE, SendAlertPayload};
pub use targeting::{RoleScope, TargetingMode, resolve_recipients};

use crate::error::AlertError;
use sea_orm::DatabaseConnection;

/// Runs one alert batch end to end.
#[tracing::instrument(skip_all)]
pub async fn send_alert_batch(
    db: &DatabaseConnection,
    mailer: &dyn AlertMailer,
    payload: SendAlertPayload,
    max_concurrent_sends: usize,
) -> Result<DispatchReport, AlertError> {
    tracing::info!(phase = "validating", "Alert batch received");
    let request = AlertRequest::try_from(payload).inspect_err(|e| {
        tracing::info!(phase = "rejected", reason = %e, "Alert batch rejected");
    })?;

    tracing::info!(phase = "resolving", targeting = ?request.targeting);
    let recipients = resolve_recipients(db, &request.targeting)
        .await
        .inspect_err(|e| {
            tracing::error!(
                name = "alerts.send_alert_batch.resolve_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to resolve alert recipients"
            );
        })?;

    if recipients.is_empty() {
        tracing::info!(phase = "reporting", "No enabled users matched the alert filter");
        return Ok(DispatchReport::default());
    }

    tracing::info!(
        phase = "dispatching",
        recipients = recipients.len(),
        alert_type = %request.content.alert_type
    );
    let report = dispatch(mailer, recipients, &request.content, max_concurrent_sends).await;

    tracing::info!(
        phase = "reporting",
        total_targets = report.total_targets,
        sent = report.sent,
        failed = report.failed,
        "Alert batch finished"
    );
    Ok(report)
}
