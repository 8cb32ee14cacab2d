//! Bulk dispatch: one email per resolved recipient, failures isolated per recipient.

use crate::alerts::mailer::{AlertEmail, AlertMailer};
use crate::alerts::request::AlertContent;
use crate::directory::AccountSummary;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Outcome for one recipient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResult {
    pub user_id: i32,
    pub email: String,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one batch. `results` is in resolved-recipient order and
/// `total_targets == sent + failed == results.len()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub total_targets: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<RecipientResult>,
}

impl DispatchReport {
    fn from_results(results: Vec<RecipientResult>) -> Self {
        let sent = results
            .iter()
            .filter(|r| r.status == DeliveryStatus::Sent)
            .count();
        Self {
            total_targets: results.len(),
            sent,
            failed: results.len() - sent,
            results,
        }
    }
}

impl AlertContent {
    fn email_for(&self, recipient: &AccountSummary) -> AlertEmail {
        AlertEmail {
            to: recipient.email.clone(),
            name: recipient.name.clone(),
            subject: self.subject.clone(),
            alert_type: self.alert_type.clone(),
            message: self.message.clone(),
        }
    }
}

/// Sends `content` to every recipient and reports per-recipient outcomes.
///
/// At most `max_concurrent_sends` sends are in flight; `1` awaits each send before starting the
/// next. A failed send is recorded and never aborts the batch. Nothing is retried.
#[tracing::instrument(skip_all, fields(recipients = recipients.len(), max_concurrent_sends = max_concurrent_sends))]
pub async fn dispatch(
    mailer: &dyn AlertMailer,
    recipients: Vec<AccountSummary>,
    content: &AlertContent,
    max_concurrent_sends: usize,
) -> DispatchReport {
    let results = stream::iter(recipients)
        .map(|recipient| async move {
            let email = content.email_for(&recipient);
            match mailer.send_alert(&email).await {
                Ok(()) => {
                    tracing::debug!(user_id = recipient.user_id, "Alert email sent");
                    RecipientResult {
                        user_id: recipient.user_id,
                        email: recipient.email,
                        status: DeliveryStatus::Sent,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        name = "alerts.dispatch.send_failed",
                        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                        user_id = recipient.user_id,
                        error = %e,
                        message = "Failed to send alert email"
                    );
                    RecipientResult {
                        user_id: recipient.user_id,
                        email: recipient.email,
                        status: DeliveryStatus::Failed,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .buffered(max_concurrent_sends.max(1))
        .collect::<Vec<_>>()
        .await;

    DispatchReport::from_results(results)
}
