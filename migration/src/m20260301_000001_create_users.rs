use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).big_integer().auto_increment().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PinHash).string().not_null())
                    .col(ColumnDef::new(Users::AvailableForWithdraw).decimal_len(20, 8).not_null().default(0))
                    .col(ColumnDef::new(Users::IsBanned).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::TelegramChatId).big_integer().null())
                    .col(ColumnDef::new(Users::TelegramUsername).text().null())
                    .col(ColumnDef::new(Users::AccountManagementPaidAt).timestamp().null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PinHash,
    AvailableForWithdraw,
    IsBanned,
    TelegramChatId,
    TelegramUsername,
    AccountManagementPaidAt,
    CreatedAt,
}
