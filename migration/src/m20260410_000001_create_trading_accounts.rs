use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TradingAccounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TradingAccounts::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(TradingAccounts::UserId).big_integer().not_null())
                    .col(ColumnDef::new(TradingAccounts::MetaapiAccountId).text().not_null())
                    .col(ColumnDef::new(TradingAccounts::Login).text().not_null())
                    .col(ColumnDef::new(TradingAccounts::Server).text().not_null())
                    .col(ColumnDef::new(TradingAccounts::Platform).string().not_null().default("mt5")) // "mt4" or "mt5"
                    .col(ColumnDef::new(TradingAccounts::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trading_accounts_user")
                            .from(TradingAccounts::Table, TradingAccounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TradingAccounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TradingAccounts {
    Table,
    Id,
    UserId,
    MetaapiAccountId,
    Login,
    Server,
    Platform,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
