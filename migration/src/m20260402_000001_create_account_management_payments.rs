use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccountManagementPayments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AccountManagementPayments::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(AccountManagementPayments::UserId).big_integer().not_null())
                    .col(ColumnDef::new(AccountManagementPayments::Amount).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(AccountManagementPayments::Wallet).text().not_null())
                    .col(ColumnDef::new(AccountManagementPayments::TxId).text().not_null())
                    .col(ColumnDef::new(AccountManagementPayments::Status).string().not_null().default("pending")) // "pending", "verified", "rejected"
                    .col(ColumnDef::new(AccountManagementPayments::VerifiedAt).timestamp().null())
                    .col(ColumnDef::new(AccountManagementPayments::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_management_payments_user")
                            .from(AccountManagementPayments::Table, AccountManagementPayments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccountManagementPayments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AccountManagementPayments {
    Table,
    Id,
    UserId,
    Amount,
    Wallet,
    TxId,
    Status,
    VerifiedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
