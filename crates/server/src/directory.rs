//! User Directory access.
//!
//! Read-side queries for alert targeting plus the single write this service owns: the
//! per-account email alert opt-in flag.

use crate::entity::user::{self, Role};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Debug, Error)]
#[error("Directory query failed: {0}")]
pub struct DirectoryError(#[from] pub DbErr);

/// How a filter constrains `user_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserIdMatch {
    Exact(i32),
    AnyOf(Vec<i32>),
}

/// Equality / set-membership filter over accounts. Unset fields do not constrain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub user_ids: Option<UserIdMatch>,
    pub role: Option<Role>,
    pub email_alerts_enabled: Option<bool>,
}

impl AccountFilter {
    /// Accounts that enabled email alerts.
    pub fn opted_in() -> Self {
        Self {
            email_alerts_enabled: Some(true),
            ..Default::default()
        }
    }

    pub fn with_user_ids(mut self, user_ids: UserIdMatch) -> Self {
        self.user_ids = Some(user_ids);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(enabled) = self.email_alerts_enabled {
            condition = condition.add(user::Column::EmailAlertsEnabled.eq(enabled));
        }
        match &self.user_ids {
            Some(UserIdMatch::Exact(id)) => {
                condition = condition.add(user::Column::UserId.eq(*id));
            }
            Some(UserIdMatch::AnyOf(ids)) => {
                condition = condition.add(user::Column::UserId.is_in(ids.iter().copied()));
            }
            None => {}
        }
        if let Some(role) = self.role {
            condition = condition.add(user::Column::Role.eq(role));
        }
        condition
    }
}

/// Account projection returned to alerting and admin listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub email_alerts_enabled: bool,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
}

impl From<user::Model> for AccountSummary {
    fn from(model: user::Model) -> Self {
        Self {
            user_id: model.user_id,
            name: model.name,
            email: model.email,
            role: model.role,
            email_alerts_enabled: model.email_alerts_enabled,
            created_at: model.created_at,
        }
    }
}

/// Accounts matching `filter`, in ascending `user_id` (creation) order.
///
/// The explicit sort stands in for the store's natural retrieval order, which no backend
/// guarantees, so repeated resolutions over an unchanged directory return the same sequence.
#[tracing::instrument(skip(db))]
pub async fn find_accounts(
    db: &DatabaseConnection,
    filter: &AccountFilter,
) -> Result<Vec<AccountSummary>, DirectoryError> {
    let rows = user::Entity::find()
        .filter(filter.condition())
        .order_by_asc(user::Column::UserId)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(AccountSummary::from).collect())
}

#[tracing::instrument(skip(db))]
pub async fn find_account(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<AccountSummary>, DirectoryError> {
    let row = user::Entity::find_by_id(user_id).one(db).await?;
    Ok(row.map(AccountSummary::from))
}

/// Sets the opt-in flag. Returns `None` when the account does not exist.
#[tracing::instrument(skip(db))]
pub async fn set_email_alerts(
    db: &DatabaseConnection,
    user_id: i32,
    enabled: bool,
) -> Result<Option<AccountSummary>, DirectoryError> {
    let Some(existing) = user::Entity::find_by_id(user_id).one(db).await? else {
        return Ok(None);
    };

    let mut model: user::ActiveModel = existing.into();
    model.email_alerts_enabled = Set(enabled);
    model.updated_at = Set(Some(OffsetDateTime::now_utc()));
    let updated = model.update(db).await?;

    tracing::info!(user_id, enabled, "Updated email alert preference");
    Ok(Some(updated.into()))
}
