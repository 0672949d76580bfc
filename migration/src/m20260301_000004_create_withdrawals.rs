use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Withdrawals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Withdrawals::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(Withdrawals::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Withdrawals::Amount).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(Withdrawals::Wallet).text().not_null())
                    .col(ColumnDef::new(Withdrawals::Status).string().not_null().default("pending")) // "pending", "processing", "completed", "failed"
                    .col(ColumnDef::new(Withdrawals::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("idx_withdrawals_user")
                            .table(Withdrawals::Table)
                            .col(Withdrawals::UserId)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_withdrawals_user")
                            .from(Withdrawals::Table, Withdrawals::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Withdrawals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Withdrawals {
    Table,
    Id,
    UserId,
    Amount,
    Wallet,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
