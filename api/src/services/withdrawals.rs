//! Withdrawal flow: debit first, then dispatch to whichever payout
//! provider is configured. A failed dispatch credits the balance back.

use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde_json::Value;
use shared::entity::{users, withdrawals};
use shared::payout::{select_route, PayoutRoute};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Withdrawals are only accepted in the nightly window, 23:00 to 01:00 UTC.
pub fn withdraw_window_open(now: DateTime<Utc>) -> bool {
    let hour = now.hour();
    hour >= 23 || hour < 1
}

/// Provider order id / idempotency key for a withdrawal row.
pub fn order_id_for(withdrawal_id: u64) -> String {
    format!("wd-{withdrawal_id}")
}

pub fn withdrawal_id_from_order(order_id: &str) -> Option<u64> {
    order_id.strip_prefix("wd-")?.parse().ok()
}

/// Deduct `amount` from a balance, refusing overdraw.
pub fn debit(balance: Decimal, amount: Decimal) -> Option<Decimal> {
    if amount > balance {
        None
    } else {
        Some(balance - amount)
    }
}

pub fn credit(balance: Decimal, amount: Decimal) -> Decimal {
    balance + amount
}

/// Debit the balance and record a pending withdrawal, then dispatch it.
pub async fn place_withdrawal(
    state: &AppState,
    user: &users::Model,
    amount: Decimal,
    wallet: &str,
) -> ApiResult<withdrawals::Model> {
    if !withdraw_window_open(Utc::now()) {
        return Err(ApiError::bad_request(
            "Withdrawals are only accepted between 23:00 and 01:00 UTC",
        ));
    }
    if amount <= Decimal::ZERO {
        return Err(ApiError::bad_request("Amount must be positive"));
    }

    let txn = state.db.begin().await?;
    // Re-read the balance inside the transaction so concurrent requests
    // cannot overdraw.
    let fresh = users::Entity::find_by_id(user.id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let remaining = debit(fresh.available_for_withdraw, amount)
        .ok_or_else(|| ApiError::bad_request("Insufficient balance"))?;
    users::ActiveModel {
        id: Set(fresh.id),
        available_for_withdraw: Set(remaining),
        ..Default::default()
    }
    .update(&txn)
    .await?;
    let withdrawal = withdrawals::ActiveModel {
        user_id: Set(user.id),
        amount: Set(amount),
        wallet: Set(wallet.to_string()),
        status: Set(withdrawals::status::PENDING.to_string()),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(
        "Withdrawal {} placed: {} to {} for user {}",
        withdrawal.id, amount, wallet, user.id
    );
    state
        .notifier
        .notify_admin(&format!(
            "Withdrawal #{} requested by {}: {} USDT to <code>{}</code>",
            withdrawal.id, user.email, amount, wallet
        ))
        .await;

    dispatch(state, withdrawal).await
}

/// Send a pending withdrawal to the first configured provider. Cryptomus is
/// confirmed asynchronously by webhook; Bybit confirms on submission; with
/// no provider configured the row stays pending for manual handling.
pub async fn dispatch(
    state: &AppState,
    withdrawal: withdrawals::Model,
) -> ApiResult<withdrawals::Model> {
    let route = select_route(
        state.cryptomus.is_payout_configured(),
        state.bybit.is_configured(),
    );
    let order_id = order_id_for(withdrawal.id);
    let amount = withdrawal.amount.to_string();

    match route {
        PayoutRoute::Manual => {
            warn!(
                "No payout provider configured, withdrawal {} left pending",
                withdrawal.id
            );
            state
                .notifier
                .notify_admin(&format!(
                    "Withdrawal #{} of {} USDT to <code>{}</code> needs manual processing",
                    withdrawal.id, withdrawal.amount, withdrawal.wallet
                ))
                .await;
            Ok(withdrawal)
        }
        PayoutRoute::Cryptomus => {
            match state
                .cryptomus
                .create_payout(&amount, &withdrawal.wallet, &order_id)
                .await
            {
                Ok(payout) => {
                    mark(
                        state,
                        withdrawal,
                        withdrawals::status::PROCESSING,
                        "cryptomus",
                        &payout.uuid,
                    )
                    .await
                }
                Err(e) => fail_and_refund(state, withdrawal, &e.to_string()).await,
            }
        }
        PayoutRoute::Bybit => {
            match state
                .bybit
                .create_withdraw(&withdrawal.wallet, &amount, Some(&order_id))
                .await
            {
                Ok(bybit_id) => {
                    mark(
                        state,
                        withdrawal,
                        withdrawals::status::COMPLETED,
                        "bybit",
                        &bybit_id,
                    )
                    .await
                }
                Err(e) => fail_and_refund(state, withdrawal, &e.to_string()).await,
            }
        }
    }
}

async fn mark(
    state: &AppState,
    withdrawal: withdrawals::Model,
    status: &str,
    provider: &str,
    provider_ref: &str,
) -> ApiResult<withdrawals::Model> {
    info!(
        "Withdrawal {} accepted by {} ({}), status {}",
        withdrawal.id, provider, provider_ref, status
    );
    let updated = withdrawals::ActiveModel {
        id: Set(withdrawal.id),
        status: Set(status.to_string()),
        provider: Set(Some(provider.to_string())),
        provider_ref: Set(Some(provider_ref.to_string())),
        ..Default::default()
    }
    .update(state.db.as_ref())
    .await?;
    Ok(updated)
}

/// Mark the withdrawal failed and credit the amount back, in one
/// transaction. The user is told their balance was restored.
async fn fail_and_refund(
    state: &AppState,
    withdrawal: withdrawals::Model,
    reason: &str,
) -> ApiResult<withdrawals::Model> {
    warn!("Withdrawal {} failed: {}", withdrawal.id, reason);
    let txn = state.db.begin().await?;
    let updated = withdrawals::ActiveModel {
        id: Set(withdrawal.id),
        status: Set(withdrawals::status::FAILED.to_string()),
        failure_reason: Set(Some(reason.to_string())),
        ..Default::default()
    }
    .update(&txn)
    .await?;
    let user = users::Entity::find_by_id(withdrawal.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    users::ActiveModel {
        id: Set(user.id),
        available_for_withdraw: Set(credit(user.available_for_withdraw, withdrawal.amount)),
        ..Default::default()
    }
    .update(&txn)
    .await?;
    txn.commit().await?;

    state
        .notifier
        .notify_user(
            user.telegram_chat_id,
            &format!(
                "Your withdrawal of {} USDT could not be processed. The amount was returned to your balance.",
                withdrawal.amount
            ),
        )
        .await;
    state
        .notifier
        .notify_admin(&format!("Withdrawal #{} failed: {}", withdrawal.id, reason))
        .await;
    Ok(updated)
}

/// What a provider status event means for a withdrawal in its current state.
/// Settled rows never move again: a late success after the amount was
/// credited back would pay out twice, and a late failure after completion
/// has nothing left to refund.
#[derive(Debug, PartialEq, Eq)]
pub enum WebhookAction {
    Complete,
    FailAndRefund,
    Ignore,
}

pub fn classify_webhook(current_status: &str, event_status: &str) -> WebhookAction {
    let open = current_status == withdrawals::status::PENDING
        || current_status == withdrawals::status::PROCESSING;
    match event_status {
        "paid" | "paid_over" | "completed" | "success" if open => WebhookAction::Complete,
        "fail" | "cancel" | "system_fail" | "wrong_amount" if open => WebhookAction::FailAndRefund,
        _ => WebhookAction::Ignore,
    }
}

/// Apply a Cryptomus payout webhook. The signature must verify against the
/// payout API key; intermediate (non-final) statuses are ignored.
pub async fn apply_webhook(state: &AppState, payload: &Value) -> ApiResult<()> {
    if !shared::payout::cryptomus::verify_webhook_signature(
        payload,
        &state.config.cryptomus.payout_api_key,
    ) {
        return Err(ApiError::Unauthorized("Invalid webhook signature".to_string()));
    }

    let order_id = payload
        .get("order_id")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::bad_request("Missing order_id"))?;
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let is_final = payload
        .get("is_final")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let withdrawal_id = withdrawal_id_from_order(order_id)
        .ok_or_else(|| ApiError::bad_request("Unrecognized order_id"))?;
    let withdrawal = withdrawals::Entity::find_by_id(withdrawal_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Withdrawal not found"))?;

    match classify_webhook(&withdrawal.status, status) {
        WebhookAction::Complete => {
            withdrawals::ActiveModel {
                id: Set(withdrawal.id),
                status: Set(withdrawals::status::COMPLETED.to_string()),
                ..Default::default()
            }
            .update(state.db.as_ref())
            .await?;
            info!("Withdrawal {} completed via webhook", withdrawal.id);
            let user = users::Entity::find_by_id(withdrawal.user_id)
                .one(state.db.as_ref())
                .await?;
            if let Some(user) = user {
                state
                    .notifier
                    .notify_user(
                        user.telegram_chat_id,
                        &format!("Your withdrawal of {} USDT was sent.", withdrawal.amount),
                    )
                    .await;
            }
        }
        WebhookAction::FailAndRefund => {
            fail_and_refund(state, withdrawal, &format!("provider status: {status}")).await?;
        }
        WebhookAction::Ignore => {
            if is_final {
                warn!(
                    "Ignoring final webhook status '{}' for withdrawal {} already {}",
                    status, withdrawal.id, withdrawal.status
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, h, m, 0).unwrap()
    }

    #[test]
    fn window_covers_the_nightly_span() {
        assert!(withdraw_window_open(at(23, 0)));
        assert!(withdraw_window_open(at(23, 59)));
        assert!(withdraw_window_open(at(0, 0)));
        assert!(withdraw_window_open(at(0, 59)));
    }

    #[test]
    fn window_is_closed_elsewhere() {
        assert!(!withdraw_window_open(at(1, 0)));
        assert!(!withdraw_window_open(at(12, 0)));
        assert!(!withdraw_window_open(at(22, 59)));
    }

    #[test]
    fn order_id_roundtrips() {
        assert_eq!(order_id_for(42), "wd-42");
        assert_eq!(withdrawal_id_from_order("wd-42"), Some(42));
        assert_eq!(withdrawal_id_from_order("payment-42"), None);
        assert_eq!(withdrawal_id_from_order("wd-abc"), None);
    }

    #[test]
    fn debit_refuses_overdraw() {
        let balance = Decimal::new(10_00, 2);
        assert_eq!(debit(balance, Decimal::new(10_01, 2)), None);
        assert_eq!(debit(balance, balance), Some(Decimal::ZERO));
    }

    #[test]
    fn failed_dispatch_restores_the_balance() {
        let balance = Decimal::new(150_75, 2);
        let amount = Decimal::new(40, 0);
        let after_debit = debit(balance, amount).unwrap();
        assert_eq!(credit(after_debit, amount), balance);
    }

    #[test]
    fn success_events_only_complete_open_withdrawals() {
        use withdrawals::status::{COMPLETED, FAILED, PENDING, PROCESSING};

        assert_eq!(classify_webhook(PROCESSING, "paid"), WebhookAction::Complete);
        assert_eq!(classify_webhook(PENDING, "paid_over"), WebhookAction::Complete);
        // A success landing after the refund must not flip the row back.
        assert_eq!(classify_webhook(FAILED, "paid"), WebhookAction::Ignore);
        // Replays of an already-applied success change nothing.
        assert_eq!(classify_webhook(COMPLETED, "paid"), WebhookAction::Ignore);
    }

    #[test]
    fn failure_events_only_refund_open_withdrawals() {
        use withdrawals::status::{COMPLETED, FAILED, PENDING, PROCESSING};

        assert_eq!(classify_webhook(PROCESSING, "fail"), WebhookAction::FailAndRefund);
        assert_eq!(classify_webhook(PENDING, "cancel"), WebhookAction::FailAndRefund);
        assert_eq!(classify_webhook(FAILED, "fail"), WebhookAction::Ignore);
        assert_eq!(classify_webhook(COMPLETED, "system_fail"), WebhookAction::Ignore);
    }

    #[test]
    fn unknown_statuses_are_ignored() {
        assert_eq!(
            classify_webhook(withdrawals::status::PROCESSING, "check"),
            WebhookAction::Ignore
        );
    }
}
