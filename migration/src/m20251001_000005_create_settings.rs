use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    SellingPricePerLiter,
    InvestorFeePerLiter,
    BuyPricePerLiter,
    CourierFeePerLiter,
    AffiliateFeePerLiter,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::SellingPricePerLiter).decimal_len(16, 2).null())
                    .col(ColumnDef::new(Settings::InvestorFeePerLiter).decimal_len(16, 2).null())
                    .col(ColumnDef::new(Settings::BuyPricePerLiter).decimal_len(16, 2).null())
                    .col(ColumnDef::new(Settings::CourierFeePerLiter).decimal_len(16, 2).null())
                    .col(ColumnDef::new(Settings::AffiliateFeePerLiter).decimal_len(16, 2).null())
                    .col(
                        ColumnDef::new(Settings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // the single settings row; rates stay NULL so the service defaults apply
        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Settings::Table)
                    .columns([Settings::Id])
                    .values_panic([1.into()])
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Settings::Table).to_owned())
            .await?;
        Ok(())
    }
}
