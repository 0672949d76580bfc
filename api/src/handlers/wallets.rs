//! Trusted payout wallets. Withdrawals only go to addresses saved here.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Extension, Json};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use shared::entity::{trusted_wallets, users};
use shared::models::{AddWalletRequest, MessageResponse, SetDefaultWalletRequest, WalletInfo};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn to_info(w: &trusted_wallets::Model) -> WalletInfo {
    WalletInfo {
        id: w.id,
        wallet: w.wallet.clone(),
        label: w.label.clone(),
        is_default: w.is_default,
    }
}

async fn clear_default(state: &AppState, user_id: i64) -> ApiResult<()> {
    trusted_wallets::Entity::update_many()
        .col_expr(trusted_wallets::Column::IsDefault, Expr::value(false))
        .filter(trusted_wallets::Column::UserId.eq(user_id))
        .exec(state.db.as_ref())
        .await?;
    Ok(())
}

/// GET /wallets
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
) -> ApiResult<Json<Vec<WalletInfo>>> {
    let wallets = trusted_wallets::Entity::find()
        .filter(trusted_wallets::Column::UserId.eq(user.id))
        .order_by_asc(trusted_wallets::Column::Id)
        .all(state.db.as_ref())
        .await?;
    Ok(Json(wallets.iter().map(to_info).collect()))
}

/// POST /wallets
///
/// The first saved wallet becomes the default automatically.
pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Json(req): Json<AddWalletRequest>,
) -> ApiResult<Json<WalletInfo>> {
    let wallet = req.wallet.trim().to_string();
    if wallet.len() < 16 {
        return Err(ApiError::bad_request("Wallet address looks too short"));
    }

    let existing = trusted_wallets::Entity::find()
        .filter(trusted_wallets::Column::UserId.eq(user.id))
        .all(state.db.as_ref())
        .await?;
    if existing.iter().any(|w| w.wallet == wallet) {
        return Err(ApiError::bad_request("Wallet already saved"));
    }

    let make_default = req.is_default || existing.is_empty();
    if make_default {
        clear_default(&state, user.id).await?;
    }

    let saved = trusted_wallets::ActiveModel {
        user_id: Set(user.id),
        wallet: Set(wallet),
        label: Set(req.label.map(|l| l.trim().to_string())),
        is_default: Set(make_default),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await?;
    Ok(Json(to_info(&saved)))
}

/// PUT /wallets/default
pub async fn set_default(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Json(req): Json<SetDefaultWalletRequest>,
) -> ApiResult<Json<WalletInfo>> {
    let wallet = trusted_wallets::Entity::find_by_id(req.wallet_id)
        .filter(trusted_wallets::Column::UserId.eq(user.id))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Wallet not found"))?;

    clear_default(&state, user.id).await?;
    let updated = trusted_wallets::ActiveModel {
        id: Set(wallet.id),
        is_default: Set(true),
        ..Default::default()
    }
    .update(state.db.as_ref())
    .await?;
    Ok(Json(to_info(&updated)))
}

/// DELETE /wallets/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Path(wallet_id): Path<u64>,
) -> ApiResult<Json<MessageResponse>> {
    let wallet = trusted_wallets::Entity::find_by_id(wallet_id)
        .filter(trusted_wallets::Column::UserId.eq(user.id))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Wallet not found"))?;

    trusted_wallets::Entity::delete_by_id(wallet.id)
        .exec(state.db.as_ref())
        .await?;
    Ok(Json(MessageResponse {
        message: "Wallet removed".to_string(),
    }))
}
