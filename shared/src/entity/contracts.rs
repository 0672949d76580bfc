//! `SeaORM` Entity, @generated manually

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub user_id: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub amount: Decimal,
    pub status: String, // "pending", "active", "completed", "refunded"
    pub started_at: Option<DateTimeUtc>,
    pub duration_days: i32, // 30, 60 or 90; refund after this period
    #[sea_orm(column_type = "Text", nullable)]
    pub payout_wallet: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_wallet: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_tx_id: Option<String>,
    pub refunded_at: Option<DateTimeUtc>,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::run_sessions::Entity")]
    RunSessions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::run_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RunSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub mod status {
    pub const PENDING: &str = "pending";
    pub const ACTIVE: &str = "active";
    pub const COMPLETED: &str = "completed";
    pub const REFUNDED: &str = "refunded";
}
