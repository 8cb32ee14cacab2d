//! Adds the email alert opt-in flag to accounts.
//!
//! Adds columns for:
//! - email_alerts_enabled: whether the account receives bulk alert emails (default off)
//! - updated_at: last time the account row was changed

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(boolean(Users::EmailAlertsEnabled).default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(timestamp_with_time_zone_null(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Bulk dispatch always filters on the opt-in flag first.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_email_alerts_enabled_role")
                    .table(Users::Table)
                    .col(Users::EmailAlertsEnabled)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_users_email_alerts_enabled_role")
                    .table(Users::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::EmailAlertsEnabled)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum Users {
    Table,
    EmailAlertsEnabled,
    Role,
    UpdatedAt,
}
