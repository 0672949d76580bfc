//! `SeaORM` Entity, @generated manually

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub pin_hash: String,
    /// System-maintained withdrawable balance; never the contract principal.
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub available_for_withdraw: Decimal,
    pub is_banned: bool,
    pub telegram_chat_id: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub telegram_username: Option<String>,
    pub account_management_paid_at: Option<DateTimeUtc>,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contracts::Entity")]
    Contracts,
    #[sea_orm(has_many = "super::withdrawals::Entity")]
    Withdrawals,
    #[sea_orm(has_many = "super::trusted_wallets::Entity")]
    TrustedWallets,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl Related<super::withdrawals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawals.def()
    }
}

impl Related<super::trusted_wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrustedWallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
