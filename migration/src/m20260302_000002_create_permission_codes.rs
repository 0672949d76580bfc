use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PermissionCodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PermissionCodes::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(PermissionCodes::Code).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(PermissionCodes::UsedAt).timestamp().null())
                    .col(ColumnDef::new(PermissionCodes::UsedByUserId).big_integer().null())
                    .col(ColumnDef::new(PermissionCodes::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PermissionCodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PermissionCodes {
    Table,
    Id,
    Code,
    UsedAt,
    UsedByUserId,
    CreatedAt,
}
