pub use sea_orm_migration::prelude::*;

mod m20260301_000000_create_users_table;
mod m20260305_000000_add_email_alert_opt_in;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000000_create_users_table::Migration),
            Box::new(m20260305_000000_add_email_alert_opt_in::Migration),
        ]
    }
}
