//! Withdrawal endpoints and the Cryptomus payout webhook.

use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde_json::Value;
use shared::entity::{trusted_wallets, users, withdrawals};
use shared::models::{MessageResponse, WithdrawRequest, WithdrawResponse, WithdrawalInfo};

use crate::error::{ApiError, ApiResult};
use crate::services;
use crate::state::AppState;

/// POST /withdraw
///
/// The destination must be a saved trusted wallet; with none given the
/// default wallet is used.
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Json(req): Json<WithdrawRequest>,
) -> ApiResult<Json<WithdrawResponse>> {
    let wallets = trusted_wallets::Entity::find()
        .filter(trusted_wallets::Column::UserId.eq(user.id))
        .all(state.db.as_ref())
        .await?;

    let wallet = match req.wallet.as_deref().map(str::trim) {
        Some(requested) if !requested.is_empty() => wallets
            .iter()
            .find(|w| w.wallet == requested)
            .map(|w| w.wallet.clone())
            .ok_or_else(|| {
                ApiError::bad_request("Wallet is not in your trusted list; add it first")
            })?,
        _ => wallets
            .iter()
            .find(|w| w.is_default)
            .map(|w| w.wallet.clone())
            .ok_or_else(|| ApiError::bad_request("No default wallet set; add one first"))?,
    };

    let withdrawal = services::withdrawals::place_withdrawal(&state, &user, req.amount, &wallet)
        .await?;
    let message = match withdrawal.status.as_str() {
        withdrawals::status::COMPLETED => "Withdrawal sent.",
        withdrawals::status::PROCESSING => "Withdrawal submitted; it completes shortly.",
        withdrawals::status::FAILED => {
            "Withdrawal failed; the amount was returned to your balance."
        }
        _ => "Withdrawal recorded and queued for manual processing.",
    };
    Ok(Json(WithdrawResponse {
        message: message.to_string(),
        withdrawal_id: withdrawal.id,
        status: withdrawal.status,
        provider: withdrawal.provider,
    }))
}

/// GET /withdrawals/history
pub async fn history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
) -> ApiResult<Json<Vec<WithdrawalInfo>>> {
    let rows = withdrawals::Entity::find()
        .filter(withdrawals::Column::UserId.eq(user.id))
        .order_by_desc(withdrawals::Column::Id)
        .all(state.db.as_ref())
        .await?;
    Ok(Json(
        rows.into_iter()
            .map(|w| WithdrawalInfo {
                id: w.id,
                amount: w.amount,
                wallet: w.wallet,
                status: w.status,
                provider: w.provider,
                created_at: w.created_at,
            })
            .collect(),
    ))
}

/// POST /webhooks/cryptomus: signed callback with the payout outcome.
pub async fn cryptomus_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<MessageResponse>> {
    services::withdrawals::apply_webhook(&state, &payload).await?;
    Ok(Json(MessageResponse {
        message: "ok".to_string(),
    }))
}
