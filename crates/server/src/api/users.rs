//! Email alert opt-in endpoints.
//!
//! - `GET /users/alerts` - Admin listing of accounts and their opt-in flag
//! - `GET /user/{user_id}/alerts` - Read one account's preference
//! - `PUT /user/{user_id}/alerts` - Change one account's preference

use crate::AppResources;
use crate::api::auth::{AdminAuth, BearerAuth};
use crate::api::extract::JsonBody;
use crate::directory::{self, AccountFilter, AccountSummary};
use crate::error::{ApiError, ErrorBody};
use axum::{
    Extension, Json,
    extract::{Path, Query},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const USERS_TAG: &str = "Alert Preferences API";

#[derive(Debug, Deserialize, IntoParams)]
pub struct SubscriberQuery {
    /// `true` or `false` to filter by opt-in state; anything else lists every account.
    pub enabled: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriberList {
    pub count: usize,
    pub users: Vec<AccountSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertPreference {
    pub user_id: i32,
    pub email_alerts_enabled: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertPreferenceUpdated {
    pub message: String,
    pub user_id: i32,
    pub email_alerts_enabled: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertPreference {
    /// Must be a JSON boolean.
    #[serde(default)]
    pub email_alerts_enabled: Option<Value>,
}

/// Creates the alert preference router.
#[tracing::instrument(skip_all)]
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_subscribers))
        .routes(routes!(get_alert_preference, update_alert_preference))
}

fn parse_enabled(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

#[tracing::instrument(skip(resources, _admin))]
#[utoipa::path(
    get,
    path = "/users/alerts",
    operation_id = "List Alert Subscribers",
    tag = USERS_TAG,
    summary = "List accounts with their email alert preference",
    security(("Authorization" = [])),
    params(SubscriberQuery),
    responses(
        (status = 200, description = "Matching accounts", body = SubscriberList),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 500, description = "Directory unavailable", body = ErrorBody)
    )
)]
async fn list_subscribers(
    Extension(resources): Extension<AppResources>,
    _admin: AdminAuth,
    Query(query): Query<SubscriberQuery>,
) -> Result<Json<SubscriberList>, ApiError> {
    let filter = AccountFilter {
        email_alerts_enabled: parse_enabled(query.enabled.as_deref()),
        ..Default::default()
    };
    let users = directory::find_accounts(resources.db.as_ref(), &filter).await?;
    Ok(Json(SubscriberList {
        count: users.len(),
        users,
    }))
}

#[tracing::instrument(skip(resources, auth))]
#[utoipa::path(
    get,
    path = "/user/{user_id}/alerts",
    operation_id = "Get Alert Preference",
    tag = USERS_TAG,
    summary = "Read an account's email alert preference",
    security(("Authorization" = [])),
    params(("user_id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "Current preference", body = AlertPreference),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Token belongs to another account", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody)
    )
)]
async fn get_alert_preference(
    Extension(resources): Extension<AppResources>,
    BearerAuth(auth): BearerAuth,
    Path(user_id): Path<i32>,
) -> Result<Json<AlertPreference>, ApiError> {
    if !auth.can_access_user(user_id) {
        return Err(ApiError::forbidden("Not allowed to access this user"));
    }
    let account = directory::find_account(resources.db.as_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(AlertPreference {
        user_id: account.user_id,
        email_alerts_enabled: account.email_alerts_enabled,
    }))
}

#[tracing::instrument(skip(resources, auth, body))]
#[utoipa::path(
    put,
    path = "/user/{user_id}/alerts",
    operation_id = "Update Alert Preference",
    tag = USERS_TAG,
    summary = "Enable or disable email alerts for an account",
    security(("Authorization" = [])),
    params(("user_id" = i32, Path, description = "Account id")),
    request_body(content = UpdateAlertPreference),
    responses(
        (status = 200, description = "Preference updated", body = AlertPreferenceUpdated),
        (status = 400, description = "emailAlertsEnabled is not a boolean", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Token belongs to another account", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody)
    )
)]
async fn update_alert_preference(
    Extension(resources): Extension<AppResources>,
    BearerAuth(auth): BearerAuth,
    Path(user_id): Path<i32>,
    JsonBody(body): JsonBody<UpdateAlertPreference>,
) -> Result<Json<AlertPreferenceUpdated>, ApiError> {
    if !auth.can_access_user(user_id) {
        return Err(ApiError::forbidden("Not allowed to access this user"));
    }
    let enabled = body
        .email_alerts_enabled
        .as_ref()
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::bad_request("emailAlertsEnabled must be true/false"))?;

    let account = directory::set_email_alerts(resources.db.as_ref(), user_id, enabled)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(AlertPreferenceUpdated {
        message: "Alert preference updated".to_string(),
        user_id: account.user_id,
        email_alerts_enabled: account.email_alerts_enabled,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_query_values() {
        assert_eq!(parse_enabled(Some("true")), Some(true));
        assert_eq!(parse_enabled(Some("false")), Some(false));
        assert_eq!(parse_enabled(Some("yes")), None);
        assert_eq!(parse_enabled(None), None);
    }
}
