use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RunSessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RunSessions::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(RunSessions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(RunSessions::ContractId).big_unsigned().not_null())
                    .col(ColumnDef::new(RunSessions::StartedAt).timestamp().not_null())
                    .col(ColumnDef::new(RunSessions::EndedAt).timestamp().null())
                    .col(ColumnDef::new(RunSessions::LastHeartbeatAt).timestamp().null())
                    .col(ColumnDef::new(RunSessions::LastEarningsSavedAt).timestamp().null())
                    .col(ColumnDef::new(RunSessions::EarningsAdded).decimal_len(20, 8).not_null().default(0))
                    .index(
                        Index::create()
                            .name("idx_run_sessions_contract_ended")
                            .table(RunSessions::Table)
                            .col(RunSessions::ContractId)
                            .col(RunSessions::EndedAt)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_run_sessions_contract")
                            .from(RunSessions::Table, RunSessions::ContractId)
                            .to(Contracts::Table, Contracts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RunEarnings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RunEarnings::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(RunEarnings::RunId).big_unsigned().not_null())
                    .col(ColumnDef::new(RunEarnings::Amount).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(RunEarnings::CreatedAt).timestamp().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .index(
                        Index::create()
                            .name("idx_run_earnings_run")
                            .table(RunEarnings::Table)
                            .col(RunEarnings::RunId)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_run_earnings_run")
                            .from(RunEarnings::Table, RunEarnings::RunId)
                            .to(RunSessions::Table, RunSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RunEarnings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RunSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RunSessions {
    Table,
    Id,
    UserId,
    ContractId,
    StartedAt,
    EndedAt,
    LastHeartbeatAt,
    LastEarningsSavedAt,
    EarningsAdded,
}

#[derive(DeriveIden)]
enum RunEarnings {
    Table,
    Id,
    RunId,
    Amount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
}
