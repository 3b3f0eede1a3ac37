pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_enums;
mod m20251001_000002_create_users;
mod m20251001_000003_create_pickups_bills_commissions;
mod m20251001_000004_create_other_expenses_notifications;
mod m20251001_000005_create_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_enums::Migration),
            Box::new(m20251001_000002_create_users::Migration),
            Box::new(m20251001_000003_create_pickups_bills_commissions::Migration),
            Box::new(m20251001_000004_create_other_expenses_notifications::Migration),
            Box::new(m20251001_000005_create_settings::Migration),
        ]
    }
}
