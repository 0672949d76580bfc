//! Contract purchase and lifecycle. A purchase records the claimed payment
//! and waits pending until the operator verifies it on-chain.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use shared::auth::verify_pin;
use shared::entity::{contract_plans, contracts, run_sessions, users, withdrawals};
use shared::models::{
    BuyContractRequest, BuyContractResponse, ContractInfo, ContractOptionsResponse,
    DashboardResponse, PlanInfo, StopContractRequest,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::services;
use crate::state::AppState;

pub const DURATION_OPTIONS_DAYS: [i32; 3] = [30, 60, 90];

fn to_info(contract: &contracts::Model) -> ContractInfo {
    ContractInfo {
        id: contract.id,
        amount: contract.amount,
        status: contract.status.clone(),
        duration_days: contract.duration_days,
        started_at: contract.started_at,
        refunded_at: contract.refunded_at,
    }
}

/// GET /contracts/options
pub async fn options(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ContractOptionsResponse>> {
    let plans = contract_plans::Entity::find()
        .order_by_asc(contract_plans::Column::Amount)
        .all(state.db.as_ref())
        .await?
        .into_iter()
        .map(|p| PlanInfo {
            id: p.id,
            amount: p.amount,
            label: p.label.unwrap_or_else(|| format!("${}", p.amount)),
        })
        .collect();
    Ok(Json(ContractOptionsResponse {
        plans,
        payment_address_erc20: state.config.payment_address_erc20.clone(),
        duration_options_days: DURATION_OPTIONS_DAYS.to_vec(),
    }))
}

/// POST /buy
pub async fn buy(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Json(req): Json<BuyContractRequest>,
) -> ApiResult<Json<BuyContractResponse>> {
    let plan = contract_plans::Entity::find_by_id(req.plan_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::bad_request("Unknown plan"))?;

    let duration_days = req.duration_days.unwrap_or(DURATION_OPTIONS_DAYS[0]);
    if !DURATION_OPTIONS_DAYS.contains(&duration_days) {
        return Err(ApiError::bad_request("Duration must be 30, 60 or 90 days"));
    }

    let payment_wallet = req.payment_wallet.trim().to_string();
    let payment_tx_id = req.payment_tx_id.trim().to_string();
    if payment_wallet.is_empty() || payment_tx_id.is_empty() {
        return Err(ApiError::bad_request(
            "Payment wallet and transaction id are required",
        ));
    }

    let contract = contracts::ActiveModel {
        user_id: Set(user.id),
        amount: Set(plan.amount),
        status: Set(contracts::status::PENDING.to_string()),
        duration_days: Set(duration_days),
        payout_wallet: Set(req.payout_wallet.map(|w| w.trim().to_string())),
        payment_wallet: Set(Some(payment_wallet.clone())),
        payment_tx_id: Set(Some(payment_tx_id.clone())),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await?;

    info!(
        "Contract {} submitted by user {} ({} / {} days)",
        contract.id, user.id, plan.amount, duration_days
    );
    state
        .notifier
        .notify_admin(&format!(
            "New contract #{} from {}: {} USDT, {} days, tx <code>{}</code>",
            contract.id, user.email, plan.amount, duration_days, payment_tx_id
        ))
        .await;

    Ok(Json(BuyContractResponse {
        message: "Contract submitted. It becomes active once the payment is verified.".to_string(),
        contract_id: contract.id,
        amount: plan.amount,
        payment_wallet,
        payment_tx_id,
    }))
}

/// GET /contracts
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
) -> ApiResult<Json<Vec<ContractInfo>>> {
    let contracts = contracts::Entity::find()
        .filter(contracts::Column::UserId.eq(user.id))
        .order_by_desc(contracts::Column::Id)
        .all(state.db.as_ref())
        .await?;
    Ok(Json(contracts.iter().map(to_info).collect()))
}

/// POST /contracts/:id/stop
///
/// Ends an active contract early: open runs are stopped with their due
/// earnings credited, then the principal returns to the withdrawable
/// balance. Requires the account PIN.
pub async fn stop(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Path(contract_id): Path<u64>,
    Json(req): Json<StopContractRequest>,
) -> ApiResult<Json<ContractInfo>> {
    if !verify_pin(req.pin.trim(), &user.pin_hash) {
        return Err(ApiError::Unauthorized("Invalid PIN".to_string()));
    }

    let contract = contracts::Entity::find_by_id(contract_id)
        .filter(contracts::Column::UserId.eq(user.id))
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Contract not found"))?;
    if contract.status != contracts::status::ACTIVE {
        return Err(ApiError::bad_request("Contract is not active"));
    }

    // Settle open runs through the run service so chunks that became due
    // since the last heartbeat are still credited, not forfeited.
    let open_runs = run_sessions::Entity::find()
        .filter(run_sessions::Column::ContractId.eq(contract.id))
        .filter(run_sessions::Column::EndedAt.is_null())
        .all(state.db.as_ref())
        .await?;
    for run in open_runs {
        services::runs::stop_run(state.db.as_ref(), user.id, run.id).await?;
    }

    let txn = state.db.begin().await?;
    let updated = contracts::ActiveModel {
        id: Set(contract.id),
        status: Set(contracts::status::COMPLETED.to_string()),
        ..Default::default()
    }
    .update(&txn)
    .await?;
    let fresh = users::Entity::find_by_id(user.id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    users::ActiveModel {
        id: Set(fresh.id),
        available_for_withdraw: Set(fresh.available_for_withdraw + contract.amount),
        ..Default::default()
    }
    .update(&txn)
    .await?;
    txn.commit().await?;

    info!("Contract {} stopped by user {}", contract.id, user.id);
    Ok(Json(to_info(&updated)))
}

/// GET /dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
) -> ApiResult<Json<DashboardResponse>> {
    let contracts = contracts::Entity::find()
        .filter(contracts::Column::UserId.eq(user.id))
        .order_by_desc(contracts::Column::Id)
        .all(state.db.as_ref())
        .await?;
    let total_principal: Decimal = contracts
        .iter()
        .filter(|c| c.status == contracts::status::ACTIVE)
        .map(|c| c.amount)
        .sum();

    let total_withdrawn: Decimal = withdrawals::Entity::find()
        .filter(withdrawals::Column::UserId.eq(user.id))
        .filter(withdrawals::Column::Status.eq(withdrawals::status::COMPLETED))
        .all(state.db.as_ref())
        .await?
        .iter()
        .map(|w| w.amount)
        .sum();

    Ok(Json(DashboardResponse {
        contracts: contracts.len(),
        contract_list: contracts.iter().map(to_info).collect(),
        total_principal,
        available_for_withdraw: user.available_for_withdraw,
        total_withdrawn,
        account_management_paid: user.account_management_paid_at.is_some(),
    }))
}
