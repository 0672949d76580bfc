use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PinResetCodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PinResetCodes::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(PinResetCodes::Email).string().not_null())
                    .col(ColumnDef::new(PinResetCodes::Code).string_len(64).not_null())
                    .col(ColumnDef::new(PinResetCodes::ExpiresAt).timestamp().not_null())
                    .col(ColumnDef::new(PinResetCodes::UsedAt).timestamp().null())
                    .col(ColumnDef::new(PinResetCodes::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("idx_pin_reset_codes_email")
                            .table(PinResetCodes::Table)
                            .col(PinResetCodes::Email)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PinResetCodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PinResetCodes {
    Table,
    Id,
    Email,
    Code,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}
