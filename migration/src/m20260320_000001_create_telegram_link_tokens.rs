use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TelegramLinkTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TelegramLinkTokens::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(TelegramLinkTokens::UserId).big_integer().not_null())
                    .col(ColumnDef::new(TelegramLinkTokens::Token).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(TelegramLinkTokens::ExpiresAt).timestamp().not_null())
                    .col(ColumnDef::new(TelegramLinkTokens::UsedAt).timestamp().null())
                    .col(ColumnDef::new(TelegramLinkTokens::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_telegram_link_tokens_user")
                            .from(TelegramLinkTokens::Table, TelegramLinkTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TelegramLinkTokens::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TelegramLinkTokens {
    Table,
    Id,
    UserId,
    Token,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
