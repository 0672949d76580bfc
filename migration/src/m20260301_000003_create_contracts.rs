use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contracts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contracts::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(Contracts::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Contracts::Amount).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(Contracts::Status).string().not_null().default("pending")) // "pending", "active", "completed", "refunded"
                    .col(ColumnDef::new(Contracts::StartedAt).timestamp().null())
                    .col(ColumnDef::new(Contracts::DurationDays).integer().not_null().default(30))
                    .col(ColumnDef::new(Contracts::PayoutWallet).text().null())
                    .col(ColumnDef::new(Contracts::PaymentWallet).text().null())
                    .col(ColumnDef::new(Contracts::PaymentTxId).text().null())
                    .col(ColumnDef::new(Contracts::RefundedAt).timestamp().null())
                    .col(ColumnDef::new(Contracts::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("idx_contracts_user_status")
                            .table(Contracts::Table)
                            .col(Contracts::UserId)
                            .col(Contracts::Status)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contracts_user")
                            .from(Contracts::Table, Contracts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
    UserId,
    Amount,
    Status,
    StartedAt,
    DurationDays,
    PayoutWallet,
    PaymentWallet,
    PaymentTxId,
    RefundedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
