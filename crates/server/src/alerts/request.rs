//! Parsing of the inbound alert-send body into a validated [`AlertRequest`].

use crate::alerts::targeting::{RoleScope, TargetingMode};
use crate::error::AlertError;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

pub const DEFAULT_ALERT_TYPE: &str = "Emergency Alert";

/// Body of `POST /api/admin/alerts/send`.
///
/// Supports three targeting shapes:
/// - bulk: `{ message, sendToRole: "Client" | "All" }`
/// - single: `{ message, targetUserId: 4 }`
/// - multi: `{ message, targetUserIds: [2, 4, 9] }`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendAlertPayload {
    /// Free-text label shown as the email heading. Defaults to "Emergency Alert".
    #[serde(default)]
    pub alert_type: Option<String>,
    /// Overrides the default subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Alert body. Required, must not be blank. Numbers and booleans are taken as their text.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub message: Option<Value>,
    /// "Client" (default) or "All". Only used when no explicit targets are given.
    #[serde(default)]
    pub send_to_role: Option<String>,
    /// Single explicit recipient. Integer or integer string.
    #[serde(default)]
    pub target_user_id: Option<Value>,
    /// Multiple explicit recipients. Used when it is a non-empty array.
    #[serde(default)]
    pub target_user_ids: Option<Value>,
}

/// Content fields shared by every email in a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertContent {
    pub alert_type: String,
    /// Explicit subject; `None` means the mailer derives one from `alert_type`.
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertRequest {
    pub content: AlertContent,
    pub targeting: TargetingMode,
}

impl TryFrom<SendAlertPayload> for AlertRequest {
    type Error = AlertError;

    fn try_from(payload: SendAlertPayload) -> Result<Self, Self::Error> {
        let message = payload
            .message
            .as_ref()
            .and_then(message_text)
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AlertError::Validation("Message is required".into()))?;

        let targeting = parse_targeting(
            payload.target_user_id.as_ref(),
            payload.target_user_ids.as_ref(),
            payload.send_to_role.as_deref(),
        )?;

        Ok(Self {
            content: AlertContent {
                alert_type: payload
                    .alert_type
                    .unwrap_or_else(|| DEFAULT_ALERT_TYPE.to_string()),
                subject: payload.subject.filter(|s| !s.is_empty()),
                message,
            },
            targeting,
        })
    }
}

/// Picks the targeting mode. A single target beats a target list, which beats role mode.
fn parse_targeting(
    target_user_id: Option<&Value>,
    target_user_ids: Option<&Value>,
    send_to_role: Option<&str>,
) -> Result<TargetingMode, AlertError> {
    if let Some(raw) = target_user_id.filter(|v| is_present(v)) {
        let id = coerce_user_id(raw).ok_or_else(|| {
            AlertError::Validation("targetUserId must be an integer".into())
        })?;
        return Ok(TargetingMode::ExplicitSingle(id));
    }

    if let Some(items) = target_user_ids
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
    {
        let mut ids = items
            .iter()
            .map(coerce_user_id)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                AlertError::Validation("targetUserIds must contain only integers".into())
            })?;
        ids.sort_unstable();
        ids.dedup();
        return Ok(TargetingMode::ExplicitMulti(ids));
    }

    let scope = match send_to_role {
        None | Some("Client") => RoleScope::Clients,
        Some("All") => RoleScope::All,
        Some(_) => {
            return Err(AlertError::Validation(
                "sendToRole must be Client or All".into(),
            ));
        }
    };
    Ok(TargetingMode::RoleBased(scope))
}

/// Scalar message values as text. Arrays and objects carry no message.
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// `null` and `""` count as "not supplied".
fn is_present(value: &Value) -> bool {
    !matches!(value, Value::Null) && value.as_str() != Some("")
}

/// Accepts JSON integers, integral floats and integer strings.
fn coerce_user_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).ok()
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
                    .map(|f| f as i32)
            }
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
