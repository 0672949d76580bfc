//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;

/// One-time sign-up codes handed out by the operator; checked on register.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "permission_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    #[sea_orm(unique)]
    pub code: String,
    pub used_at: Option<DateTimeUtc>,
    pub used_by_user_id: Option<i64>,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
