//! Account-level extras: the one-off account management payment and
//! Telegram link tokens.

use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, Set};
use shared::auth::random_code;
use shared::entity::{account_management_payments, telegram_link_tokens, users};
use shared::models::{AccountManagementRequest, MessageResponse, TelegramLinkResponse};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const LINK_TOKEN_TTL_MINUTES: i64 = 15;

/// POST /account/management
///
/// Records the claimed payment for operator verification, like a contract
/// purchase.
pub async fn management(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Json(req): Json<AccountManagementRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if user.account_management_paid_at.is_some() {
        return Err(ApiError::bad_request("Account management is already paid"));
    }
    if req.amount <= rust_decimal::Decimal::ZERO {
        return Err(ApiError::bad_request("Amount must be positive"));
    }
    let wallet = req.wallet.trim().to_string();
    let tx_id = req.tx_id.trim().to_string();
    if wallet.is_empty() || tx_id.is_empty() {
        return Err(ApiError::bad_request("Wallet and transaction id are required"));
    }

    let payment = account_management_payments::ActiveModel {
        user_id: Set(user.id),
        amount: Set(req.amount),
        wallet: Set(wallet),
        tx_id: Set(tx_id.clone()),
        status: Set(account_management_payments::status::PENDING.to_string()),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await?;

    info!(
        "Account management payment {} submitted by user {}",
        payment.id, user.id
    );
    state
        .notifier
        .notify_admin(&format!(
            "Account management payment #{} from {}: {} USDT, tx <code>{}</code>",
            payment.id, user.email, req.amount, tx_id
        ))
        .await;
    Ok(Json(MessageResponse {
        message: "Payment submitted. It is applied once verified.".to_string(),
    }))
}

/// POST /telegram/link
///
/// Short-lived one-time token the user sends to the bot as `/start <token>`.
pub async fn telegram_link(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
) -> ApiResult<Json<TelegramLinkResponse>> {
    let token = random_code(32);
    let expires_at = Utc::now() + Duration::minutes(LINK_TOKEN_TTL_MINUTES);
    telegram_link_tokens::ActiveModel {
        user_id: Set(user.id),
        token: Set(token.clone()),
        expires_at: Set(expires_at),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await?;

    Ok(Json(TelegramLinkResponse {
        token,
        bot_name: state.config.telegram.bot_name.clone(),
        expires_at,
    }))
}
