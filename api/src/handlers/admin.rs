//! Operator endpoints, guarded by `X-Admin-Key` (or the cron key for the
//! refund sweep, which is called from a scheduler URL).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use shared::auth::random_code;
use shared::entity::{
    account_management_payments, contracts, permission_codes, pin_reset_codes, users,
};
use shared::models::{
    CreatePermissionCodesRequest, CreatePermissionCodesResponse, CreatePinResetRequest,
    CreatePinResetResponse, MessageResponse, OutboundIpResponse, ProcessRefundsResponse,
};
use shared::payout::server_outbound_ip;
use tracing::info;

use crate::auth::{check_admin_key, check_cron_key};
use crate::error::{ApiError, ApiResult};
use crate::services;
use crate::state::AppState;

const PIN_RESET_TTL_MINUTES: i64 = 30;
const PERMISSION_CODE_LEN: usize = 12;
const MAX_CODES_PER_REQUEST: u32 = 100;

fn admin_key_header(headers: &HeaderMap) -> Option<&str> {
    headers.get("X-Admin-Key").and_then(|v| v.to_str().ok())
}

/// GET /outbound-ip: the IP third parties see, for provider whitelists.
pub async fn outbound_ip(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<OutboundIpResponse>> {
    check_admin_key(&state, admin_key_header(&headers))?;
    Ok(Json(OutboundIpResponse {
        ip: server_outbound_ip().await,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CronQuery {
    #[serde(default)]
    pub key: String,
}

/// GET /cron/process-refunds?key=...: expire contracts past their term.
pub async fn process_refunds(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CronQuery>,
) -> ApiResult<Json<ProcessRefundsResponse>> {
    check_cron_key(&state, Some(query.key.as_str()).filter(|k| !k.is_empty()))?;
    let refunded_contracts = services::refunds::process_refunds(&state).await?;
    Ok(Json(ProcessRefundsResponse { refunded_contracts }))
}

/// POST /admin/create-pin-reset: one-time reset code the operator reads
/// out to the user over a verified channel.
pub async fn create_pin_reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreatePinResetRequest>,
) -> ApiResult<Json<CreatePinResetResponse>> {
    check_admin_key(&state, admin_key_header(&headers))?;
    let email = req.email.trim().to_lowercase();
    users::Entity::find()
        .filter(users::Column::Email.eq(&email))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("No user with that email"))?;

    let code = random_code(8);
    let expires_at = Utc::now() + Duration::minutes(PIN_RESET_TTL_MINUTES);
    pin_reset_codes::ActiveModel {
        email: Set(email.clone()),
        code: Set(code.clone()),
        expires_at: Set(expires_at),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await?;

    info!("PIN reset code created for {}", email);
    Ok(Json(CreatePinResetResponse { code, expires_at }))
}

/// POST /admin/permission-codes: mint one-time sign-up codes.
pub async fn create_permission_codes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreatePermissionCodesRequest>,
) -> ApiResult<Json<CreatePermissionCodesResponse>> {
    check_admin_key(&state, admin_key_header(&headers))?;
    let count = req.count.clamp(1, MAX_CODES_PER_REQUEST);

    let mut codes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let code = random_code(PERMISSION_CODE_LEN);
        permission_codes::ActiveModel {
            code: Set(code.clone()),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(state.db.as_ref())
        .await?;
        codes.push(code);
    }
    info!("Minted {} permission code(s)", codes.len());
    Ok(Json(CreatePermissionCodesResponse { codes }))
}

/// POST /admin/contracts/:id/activate: payment verified, start the term.
pub async fn activate_contract(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(contract_id): Path<u64>,
) -> ApiResult<Json<MessageResponse>> {
    check_admin_key(&state, admin_key_header(&headers))?;
    let contract = contracts::Entity::find_by_id(contract_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Contract not found"))?;
    if contract.status != contracts::status::PENDING {
        return Err(ApiError::bad_request("Contract is not pending"));
    }

    contracts::ActiveModel {
        id: Set(contract.id),
        status: Set(contracts::status::ACTIVE.to_string()),
        started_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .update(state.db.as_ref())
    .await?;

    info!("Contract {} activated", contract.id);
    let user = users::Entity::find_by_id(contract.user_id)
        .one(state.db.as_ref())
        .await?;
    if let Some(user) = user {
        state
            .notifier
            .notify_user(
                user.telegram_chat_id,
                &format!(
                    "Your contract #{} is now active. It runs for {} days.",
                    contract.id, contract.duration_days
                ),
            )
            .await;
    }
    Ok(Json(MessageResponse {
        message: "Contract activated".to_string(),
    }))
}

/// POST /admin/account-payments/:id/verify
pub async fn verify_account_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(payment_id): Path<u64>,
) -> ApiResult<Json<MessageResponse>> {
    check_admin_key(&state, admin_key_header(&headers))?;
    let payment = account_management_payments::Entity::find_by_id(payment_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Payment not found"))?;
    if payment.status != account_management_payments::status::PENDING {
        return Err(ApiError::bad_request("Payment is not pending"));
    }

    let now = Utc::now();
    account_management_payments::ActiveModel {
        id: Set(payment.id),
        status: Set(account_management_payments::status::VERIFIED.to_string()),
        verified_at: Set(Some(now)),
        ..Default::default()
    }
    .update(state.db.as_ref())
    .await?;
    users::ActiveModel {
        id: Set(payment.user_id),
        account_management_paid_at: Set(Some(now)),
        ..Default::default()
    }
    .update(state.db.as_ref())
    .await?;

    info!("Account management payment {} verified", payment.id);
    Ok(Json(MessageResponse {
        message: "Payment verified".to_string(),
    }))
}

/// POST /admin/users/:id/ban
pub async fn ban_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    check_admin_key(&state, admin_key_header(&headers))?;
    let user = users::Entity::find_by_id(user_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    users::ActiveModel {
        id: Set(user.id),
        is_banned: Set(true),
        ..Default::default()
    }
    .update(state.db.as_ref())
    .await?;
    info!("User {} banned", user.id);
    Ok(Json(MessageResponse {
        message: "User banned".to_string(),
    }))
}
