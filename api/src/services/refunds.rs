//! Contract refunds: once an active contract has run its full term the
//! principal moves back to the user's withdrawable balance.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use shared::entity::{contracts, users};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A contract is refundable once `duration_days` have passed since it was
/// activated. Pending contracts have no start date and never qualify.
pub fn refund_due(
    now: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    duration_days: i32,
) -> bool {
    match started_at {
        Some(started) => now >= started + Duration::days(i64::from(duration_days)),
        None => false,
    }
}

/// Refund every expired active contract. Each refund flips the contract to
/// refunded and credits the principal, atomically per contract.
pub async fn process_refunds(state: &AppState) -> ApiResult<usize> {
    let now = Utc::now();
    let active = contracts::Entity::find()
        .filter(contracts::Column::Status.eq(contracts::status::ACTIVE))
        .all(state.db.as_ref())
        .await?;

    let mut refunded = 0;
    for contract in active {
        if !refund_due(now, contract.started_at, contract.duration_days) {
            continue;
        }

        let txn = state.db.begin().await?;
        contracts::ActiveModel {
            id: Set(contract.id),
            status: Set(contracts::status::REFUNDED.to_string()),
            refunded_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&txn)
        .await?;
        let user = users::Entity::find_by_id(contract.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        users::ActiveModel {
            id: Set(user.id),
            available_for_withdraw: Set(user.available_for_withdraw + contract.amount),
            ..Default::default()
        }
        .update(&txn)
        .await?;
        txn.commit().await?;

        info!(
            "Refunded contract {} ({}) to user {}",
            contract.id, contract.amount, contract.user_id
        );
        state
            .notifier
            .notify_user(
                user.telegram_chat_id,
                &format!(
                    "Your contract #{} ended. The principal of {} USDT is now available for withdrawal.",
                    contract.id, contract.amount
                ),
            )
            .await;
        refunded += 1;
    }
    Ok(refunded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pending_contracts_never_qualify() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert!(!refund_due(now, None, 30));
    }

    #[test]
    fn refund_fires_exactly_after_the_term() {
        let started = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        assert!(!refund_due(started + Duration::days(29), Some(started), 30));
        assert!(refund_due(started + Duration::days(30), Some(started), 30));
        assert!(refund_due(started + Duration::days(95), Some(started), 90));
        assert!(!refund_due(started + Duration::days(89), Some(started), 90));
    }
}
