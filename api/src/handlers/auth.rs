//! Registration, login and PIN reset. Registration is gated by one-time
//! permission codes handed out by the operator.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use shared::auth::{create_token, hash_pin, normalize_pin, verify_pin};
use shared::entity::{permission_codes, pin_reset_codes, users};
use shared::models::{LoginRequest, RegisterRequest, ResetPinRequest, TokenResponse};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn normalize_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    Ok(email)
}

/// POST /register
///
/// The permission code is claimed with a conditional UPDATE so two requests
/// racing on the same code cannot both register.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let email = normalize_email(&req.email)?;
    let pin = normalize_pin(&req.pin).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let code = req.permission_code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ApiError::bad_request("Permission code is required"));
    }

    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(&email))
        .one(state.db.as_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let txn = state.db.begin().await?;
    let claimed = permission_codes::Entity::update_many()
        .col_expr(permission_codes::Column::UsedAt, Expr::value(Utc::now()))
        .filter(permission_codes::Column::Code.eq(&code))
        .filter(permission_codes::Column::UsedAt.is_null())
        .exec(&txn)
        .await?;
    if claimed.rows_affected == 0 {
        return Err(ApiError::bad_request("Invalid or already used permission code"));
    }

    let user = users::ActiveModel {
        email: Set(email.clone()),
        pin_hash: Set(hash_pin(&pin)),
        available_for_withdraw: Set(rust_decimal::Decimal::ZERO),
        is_banned: Set(false),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    permission_codes::Entity::update_many()
        .col_expr(
            permission_codes::Column::UsedByUserId,
            Expr::value(user.id),
        )
        .filter(permission_codes::Column::Code.eq(&code))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    info!("Registered user {} ({})", user.id, email);
    let token = create_token(user.id, &state.config.secret_key)?;
    Ok(Json(TokenResponse { token }))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let email = normalize_email(&req.email)?;
    let pin = normalize_pin(&req.pin).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let user = users::Entity::find()
        .filter(users::Column::Email.eq(&email))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or PIN".to_string()))?;

    if !verify_pin(&pin, &user.pin_hash) {
        return Err(ApiError::Unauthorized("Invalid email or PIN".to_string()));
    }
    if user.is_banned {
        return Err(ApiError::Forbidden("Account is banned".to_string()));
    }

    let token = create_token(user.id, &state.config.secret_key)?;
    Ok(Json(TokenResponse { token }))
}

/// POST /reset-pin
///
/// Consumes a one-time reset code created by the operator and sets a new PIN.
pub async fn reset_pin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPinRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let email = normalize_email(&req.email)?;
    let new_pin = normalize_pin(&req.new_pin).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let code = req.code.trim().to_uppercase();

    let user = users::Entity::find()
        .filter(users::Column::Email.eq(&email))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid reset code"))?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let claimed = pin_reset_codes::Entity::update_many()
        .col_expr(pin_reset_codes::Column::UsedAt, Expr::value(now))
        .filter(pin_reset_codes::Column::Email.eq(&email))
        .filter(pin_reset_codes::Column::Code.eq(&code))
        .filter(pin_reset_codes::Column::UsedAt.is_null())
        .filter(pin_reset_codes::Column::ExpiresAt.gt(now))
        .exec(&txn)
        .await?;
    if claimed.rows_affected == 0 {
        return Err(ApiError::bad_request("Invalid reset code"));
    }

    users::ActiveModel {
        id: Set(user.id),
        pin_hash: Set(hash_pin(&new_pin)),
        ..Default::default()
    }
    .update(&txn)
    .await?;
    txn.commit().await?;

    info!("PIN reset for user {}", user.id);
    let token = create_token(user.id, &state.config.secret_key)?;
    Ok(Json(TokenResponse { token }))
}
