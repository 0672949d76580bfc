use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrustedWallets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TrustedWallets::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(TrustedWallets::UserId).big_integer().not_null())
                    .col(ColumnDef::new(TrustedWallets::Wallet).text().not_null())
                    .col(ColumnDef::new(TrustedWallets::Label).text().null())
                    .col(ColumnDef::new(TrustedWallets::IsDefault).boolean().not_null().default(false))
                    .index(
                        Index::create()
                            .name("idx_trusted_wallets_user")
                            .table(TrustedWallets::Table)
                            .col(TrustedWallets::UserId)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trusted_wallets_user")
                            .from(TrustedWallets::Table, TrustedWallets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrustedWallets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrustedWallets {
    Table,
    Id,
    UserId,
    Wallet,
    Label,
    IsDefault,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
