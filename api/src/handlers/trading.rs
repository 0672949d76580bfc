//! MT4/MT5 trading accounts provisioned through MetaApi.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use shared::entity::{trading_accounts, users};
use shared::metaapi::AccountInformation;
use shared::models::{TradingAccountInfo, TradingAccountRequest};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn to_info(a: &trading_accounts::Model) -> TradingAccountInfo {
    TradingAccountInfo {
        id: a.id,
        metaapi_account_id: a.metaapi_account_id.clone(),
        login: a.login.clone(),
        server: a.server.clone(),
        platform: a.platform.clone(),
    }
}

/// POST /trading-accounts
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Json(req): Json<TradingAccountRequest>,
) -> ApiResult<Json<TradingAccountInfo>> {
    let login = req.login.trim().to_string();
    let server = req.server.trim().to_string();
    if login.is_empty() || req.password.is_empty() || server.is_empty() {
        return Err(ApiError::bad_request("Login, password and server are required"));
    }
    let platform = req.platform.as_deref().unwrap_or("mt5");

    let metaapi_account_id = state
        .metaapi
        .add_account(&login, &req.password, &server, &user.email, platform)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let account = trading_accounts::ActiveModel {
        user_id: Set(user.id),
        metaapi_account_id: Set(metaapi_account_id),
        login: Set(login),
        server: Set(server),
        platform: Set(platform.to_lowercase()),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await?;

    info!(
        "Trading account {} provisioned for user {}",
        account.id, user.id
    );
    Ok(Json(to_info(&account)))
}

/// GET /trading-accounts
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
) -> ApiResult<Json<Vec<TradingAccountInfo>>> {
    let accounts = trading_accounts::Entity::find()
        .filter(trading_accounts::Column::UserId.eq(user.id))
        .order_by_asc(trading_accounts::Column::Id)
        .all(state.db.as_ref())
        .await?;
    Ok(Json(accounts.iter().map(to_info).collect()))
}

/// GET /trading-accounts/:id/balance
pub async fn balance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Path(account_id): Path<u64>,
) -> ApiResult<Json<AccountInformation>> {
    let account = trading_accounts::Entity::find_by_id(account_id)
        .filter(trading_accounts::Column::UserId.eq(user.id))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Trading account not found"))?;

    let info = state
        .metaapi
        .get_account_information(&account.metaapi_account_id)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(Json(info))
}
