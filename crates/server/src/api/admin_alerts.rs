//! Admin alert dispatch endpoint.

use crate::AppResources;
use crate::alerts::{self, DispatchReport, RecipientResult, SendAlertPayload};
use crate::api::auth::AdminAuth;
use crate::api::extract::JsonBody;
use crate::error::{ApiError, ErrorBody};
use axum::{Extension, Json};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const ADMIN_ALERTS_TAG: &str = "Admin Alerts API";

/// Batch summary returned to the admin.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendAlertResponse {
    pub message: String,
    /// Omitted when no recipient matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_targets: Option<usize>,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<RecipientResult>,
}

impl From<DispatchReport> for SendAlertResponse {
    fn from(report: DispatchReport) -> Self {
        if report.total_targets == 0 {
            return Self {
                message: "No enabled users found for this filter".to_string(),
                total_targets: None,
                sent: 0,
                failed: 0,
                results: Vec::new(),
            };
        }
        Self {
            message: "Alert sending finished".to_string(),
            total_targets: Some(report.total_targets),
            sent: report.sent,
            failed: report.failed,
            results: report.results,
        }
    }
}

/// Creates the admin alerts router.
#[tracing::instrument(skip_all)]
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new().routes(routes!(send_alert))
}

#[tracing::instrument(skip(resources, payload), fields(admin_id = admin.user_id))]
#[utoipa::path(
    post,
    path = "/admin/alerts/send",
    operation_id = "Send Alert",
    tag = ADMIN_ALERTS_TAG,
    summary = "Send an alert email to opted-in users",
    description = "Emails an alert to every account that enabled email alerts and matches the targeting.\n\n\
                   **Targeting (first match wins):**\n\
                   1. `targetUserId` - that single account\n\
                   2. `targetUserIds` (non-empty) - those accounts\n\
                   3. `sendToRole` - `Client` (default) or `All`\n\n\
                   Explicit targets ignore `sendToRole`. Recipients are emailed one at a time by default; \
                   a failed recipient is reported and does not stop the batch.",
    security(("Authorization" = [])),
    request_body(content = SendAlertPayload, description = "Alert content and targeting"),
    responses(
        (status = 200, description = "Batch finished (possibly with zero recipients)", body = SendAlertResponse),
        (status = 400, description = "Message missing, targeting invalid or body not JSON", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 500, description = "Directory unavailable or unexpected failure", body = ErrorBody)
    )
)]
async fn send_alert(
    Extension(resources): Extension<AppResources>,
    AdminAuth(admin): AdminAuth,
    JsonBody(payload): JsonBody<SendAlertPayload>,
) -> Result<Json<SendAlertResponse>, ApiError> {
    let report = alerts::send_alert_batch(
        resources.db.as_ref(),
        resources.mailer.as_ref(),
        payload,
        resources.config.alerts.max_concurrent_sends,
    )
    .await?;
    Ok(Json(report.into()))
}
