use sea_orm_migration::prelude::*;

mod m20250615_000001_create_users;
mod m20250615_000002_create_oauth_accounts;
mod m20250615_000003_create_sessions;
mod m20250615_000004_create_one_time_codes;
mod m20250615_000005_create_password_reset_tokens;
mod m20250615_000006_create_outbox_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250615_000001_create_users::Migration),
            Box::new(m20250615_000002_create_oauth_accounts::Migration),
            Box::new(m20250615_000003_create_sessions::Migration),
            Box::new(m20250615_000004_create_one_time_codes::Migration),
            Box::new(m20250615_000005_create_password_reset_tokens::Migration),
            Box::new(m20250615_000006_create_outbox_events::Migration),
        ]
    }
}
