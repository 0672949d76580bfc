use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContractPlans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ContractPlans::Id).big_unsigned().auto_increment().primary_key())
                    .col(ColumnDef::new(ContractPlans::Amount).decimal_len(20, 8).not_null())
                    .col(ColumnDef::new(ContractPlans::Label).text().null())
                    .to_owned(),
            )
            .await?;

        // Default plans; operators can add more rows directly.
        for (amount, label) in [(1989.0, "$1989"), (2900.0, "$2900"), (4190.0, "$4190")] {
            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(ContractPlans::Table)
                        .columns([ContractPlans::Amount, ContractPlans::Label])
                        .values_panic([amount.into(), label.into()])
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContractPlans::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ContractPlans {
    Table,
    Id,
    Amount,
    Label,
}
