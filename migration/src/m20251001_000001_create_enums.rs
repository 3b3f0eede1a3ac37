use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

/// Postgres enum types shared by the core tables: (type name, variants).
const ENUMS: &[(&str, &[&str])] = &[
    (
        "user_role",
        &["ADMIN", "WAREHOUSE", "COURIER", "CUSTOMER", "AFFILIATE"],
    ),
    (
        "pickup_status",
        &["PENDING", "SCHEDULED", "COMPLETED", "CANCELLED"],
    ),
    ("bill_status", &["UNPAID", "PAID"]),
    ("commission_type", &["COURIER", "AFFILIATE"]),
    ("commission_status", &["PENDING", "PAID", "CANCELLED"]),
    (
        "notification_type",
        &[
            "PAYMENT_RECEIVED",
            "PICKUP_SCHEDULED",
            "PICKUP_COMPLETED",
            "GENERAL",
        ],
    ),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, values) in ENUMS {
            manager
                .create_type(
                    Type::create()
                        .as_enum(Alias::new(*name))
                        .values(values.iter().map(|v| Alias::new(*v)))
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in ENUMS.iter().rev() {
            manager
                .drop_type(Type::drop().if_exists().name(Alias::new(*name)).to_owned())
                .await?;
        }
        Ok(())
    }
}
