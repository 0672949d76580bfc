use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Withdrawals::Table)
                    .add_column(ColumnDef::new(Withdrawals::Provider).text().null()) // "cryptomus" or "bybit"
                    .add_column(ColumnDef::new(Withdrawals::ProviderRef).text().null())
                    .add_column(ColumnDef::new(Withdrawals::FailureReason).text().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Withdrawals::Table)
                    .drop_column(Withdrawals::Provider)
                    .drop_column(Withdrawals::ProviderRef)
                    .drop_column(Withdrawals::FailureReason)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Withdrawals {
    Table,
    Provider,
    ProviderRef,
    FailureReason,
}
