//! `SeaORM` Entity, @generated manually

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "run_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub user_id: i64,
    pub contract_id: u64,
    pub started_at: DateTimeUtc,
    pub ended_at: Option<DateTimeUtc>,
    pub last_heartbeat_at: Option<DateTimeUtc>,
    /// End of the last 10-minute chunk already credited.
    pub last_earnings_saved_at: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub earnings_added: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contracts::Entity",
        from = "Column::ContractId",
        to = "super::contracts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Contracts,
    #[sea_orm(has_many = "super::run_earnings::Entity")]
    RunEarnings,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl Related<super::run_earnings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RunEarnings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
