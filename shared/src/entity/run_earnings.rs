//! `SeaORM` Entity, @generated manually

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Append-only ledger; rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "run_earnings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub run_id: u64,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub amount: Decimal,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::run_sessions::Entity",
        from = "Column::RunId",
        to = "super::run_sessions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    RunSessions,
}

impl Related<super::run_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RunSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
