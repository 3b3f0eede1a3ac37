use sea_orm_migration::prelude::*;

use crate::m20251001_000002_create_users::Users;

#[derive(DeriveIden)]
pub enum Pickups {
    Table,
    Id,
    CustomerId,
    CourierId,
    Status,
    ScheduledDate,
    ActualDate,
    Volume,
    ActualVolume,
    TotalPrice,
    CourierFee,
    AffiliateFee,
    Address,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bills {
    Table,
    Id,
    PickupId,
    UserId,
    Amount,
    Status,
    PaidDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Commissions {
    Table,
    Id,
    PickupId,
    UserId,
    Type,
    Amount,
    Status,
    PaidDate,
    CreatedAt,
    UpdatedAt,
}

fn money<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .decimal_len(16, 2)
        .not_null()
        .default(0)
        .to_owned()
}

fn timestamps<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::cust("NOW()"))
        .to_owned()
}

async fn index<T, C>(manager: &SchemaManager<'_>, name: &str, table: T, col: C) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(name)
                .table(table)
                .col(col)
                .to_owned(),
        )
        .await
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pickups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pickups::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Pickups::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Pickups::CourierId).uuid().null())
                    .col(
                        ColumnDef::new(Pickups::Status)
                            .custom(Alias::new("pickup_status"))
                            .not_null()
                            .default(Expr::cust("'PENDING'::pickup_status")),
                    )
                    .col(
                        ColumnDef::new(Pickups::ScheduledDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pickups::ActualDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Pickups::Volume).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Pickups::ActualVolume).decimal_len(12, 2).null())
                    .col(&mut money(Pickups::TotalPrice))
                    .col(&mut money(Pickups::CourierFee))
                    .col(&mut money(Pickups::AffiliateFee))
                    .col(ColumnDef::new(Pickups::Address).text().null())
                    .col(ColumnDef::new(Pickups::Notes).text().null())
                    .col(&mut timestamps(Pickups::CreatedAt))
                    .col(&mut timestamps(Pickups::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pickups_customer")
                            .from(Pickups::Table, Pickups::CustomerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pickups_courier")
                            .from(Pickups::Table, Pickups::CourierId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bills::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bills::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bills::PickupId).uuid().not_null())
                    .col(ColumnDef::new(Bills::UserId).uuid().not_null())
                    .col(&mut money(Bills::Amount))
                    .col(
                        ColumnDef::new(Bills::Status)
                            .custom(Alias::new("bill_status"))
                            .not_null()
                            .default(Expr::cust("'UNPAID'::bill_status")),
                    )
                    .col(
                        ColumnDef::new(Bills::PaidDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(&mut timestamps(Bills::CreatedAt))
                    .col(&mut timestamps(Bills::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bills_pickup")
                            .from(Bills::Table, Bills::PickupId)
                            .to(Pickups::Table, Pickups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bills_user")
                            .from(Bills::Table, Bills::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Commissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Commissions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Commissions::PickupId).uuid().not_null())
                    .col(ColumnDef::new(Commissions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Commissions::Type)
                            .custom(Alias::new("commission_type"))
                            .not_null(),
                    )
                    .col(&mut money(Commissions::Amount))
                    .col(
                        ColumnDef::new(Commissions::Status)
                            .custom(Alias::new("commission_status"))
                            .not_null()
                            .default(Expr::cust("'PENDING'::commission_status")),
                    )
                    .col(
                        ColumnDef::new(Commissions::PaidDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(&mut timestamps(Commissions::CreatedAt))
                    .col(&mut timestamps(Commissions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_commissions_pickup")
                            .from(Commissions::Table, Commissions::PickupId)
                            .to(Pickups::Table, Pickups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_commissions_user")
                            .from(Commissions::Table, Commissions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        index(manager, "idx_pickups_customer", Pickups::Table, Pickups::CustomerId).await?;
        index(manager, "idx_pickups_courier", Pickups::Table, Pickups::CourierId).await?;
        index(manager, "idx_pickups_status", Pickups::Table, Pickups::Status).await?;
        index(manager, "idx_bills_user", Bills::Table, Bills::UserId).await?;
        index(manager, "idx_bills_status", Bills::Table, Bills::Status).await?;
        index(manager, "idx_commissions_user", Commissions::Table, Commissions::UserId).await?;
        index(
            manager,
            "idx_commissions_status",
            Commissions::Table,
            Commissions::Status,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Commissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Bills::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Pickups::Table).to_owned())
            .await?;
        Ok(())
    }
}
