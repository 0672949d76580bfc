//! Run session accrual: earnings are credited server-side in 10-minute
//! chunks so nothing is lost when the client disconnects mid-run.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use shared::entity::{contracts, run_earnings, run_sessions, users};
use tracing::info;

use crate::error::{ApiError, ApiResult};

pub const CHUNK_MINUTES: i64 = 10;
pub const MAX_RUN_HOURS: i64 = 22;
/// A heartbeat is expected every ~2 minutes; a run with none for this long
/// is considered abandoned and gets swept.
pub const STALE_AFTER_MINUTES: i64 = 10;

const CHUNKS_PER_DAY: i64 = 24 * 60 / CHUNK_MINUTES;

/// 2% of the principal per day.
fn daily_rate() -> Decimal {
    Decimal::new(2, 2)
}

pub fn cap_end(started_at: DateTime<Utc>) -> DateTime<Utc> {
    started_at + Duration::hours(MAX_RUN_HOURS)
}

/// How many full chunks elapsed between the last credited mark and `upto`
/// (clamped to the 22h cap), and where the new mark lands.
pub fn due_chunks(
    started_at: DateTime<Utc>,
    last_saved_at: Option<DateTime<Utc>>,
    upto: DateTime<Utc>,
) -> (i64, DateTime<Utc>) {
    let effective = upto.min(cap_end(started_at));
    let from = last_saved_at.unwrap_or(started_at);
    if effective <= from {
        return (0, from);
    }
    let chunks = (effective - from).num_minutes() / CHUNK_MINUTES;
    (chunks, from + Duration::minutes(chunks * CHUNK_MINUTES))
}

/// Per-chunk earnings: the daily 2% spread over 144 chunks, scaled by a
/// jitter percentage in 80..=120.
pub fn chunk_amount(principal: Decimal, jitter_pct: i64) -> Decimal {
    (principal * daily_rate() / Decimal::from(CHUNKS_PER_DAY) * Decimal::from(jitter_pct)
        / Decimal::from(100))
    .round_dp(8)
}

fn random_jitter_pct() -> i64 {
    rand::thread_rng().gen_range(80..=120)
}

#[derive(Debug, Clone)]
pub struct RunTick {
    pub run_id: u64,
    pub active: bool,
    pub ended: bool,
    pub earnings_so_far: Decimal,
}

async fn find_owned_run(
    db: &DatabaseConnection,
    user_id: i64,
    run_id: u64,
) -> ApiResult<run_sessions::Model> {
    run_sessions::Entity::find_by_id(run_id)
        .filter(run_sessions::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Run not found"))
}

/// Credit every due chunk up to `upto`: append run_earnings rows, bump the
/// session totals and the user's withdrawable balance, all in one
/// transaction. Returns the amount credited, zero when another caller
/// already advanced the mark over this window.
async fn credit_due(
    db: &DatabaseConnection,
    run: &run_sessions::Model,
    principal: Decimal,
    upto: DateTime<Utc>,
) -> ApiResult<Decimal> {
    let (chunks, new_mark) = due_chunks(run.started_at, run.last_earnings_saved_at, upto);
    if chunks == 0 {
        return Ok(Decimal::ZERO);
    }

    let txn = db.begin().await?;

    // Claim the window first: advance the mark only if it still sits where
    // this call read it. A concurrent heartbeat, stop, or sweep that already
    // moved it wins, and this call credits nothing.
    let claim = run_sessions::Entity::update_many()
        .col_expr(
            run_sessions::Column::LastEarningsSavedAt,
            Expr::value(new_mark),
        )
        .filter(run_sessions::Column::Id.eq(run.id));
    let claim = match run.last_earnings_saved_at {
        Some(prev) => claim.filter(run_sessions::Column::LastEarningsSavedAt.eq(prev)),
        None => claim.filter(run_sessions::Column::LastEarningsSavedAt.is_null()),
    };
    if claim.exec(&txn).await?.rows_affected == 0 {
        return Ok(Decimal::ZERO);
    }

    let now = Utc::now();
    let mut total = Decimal::ZERO;
    for _ in 0..chunks {
        let amount = chunk_amount(principal, random_jitter_pct());
        run_earnings::ActiveModel {
            run_id: Set(run.id),
            amount: Set(amount),
            created_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        total += amount;
    }

    run_sessions::Entity::update_many()
        .col_expr(
            run_sessions::Column::EarningsAdded,
            Expr::col(run_sessions::Column::EarningsAdded).add(total),
        )
        .filter(run_sessions::Column::Id.eq(run.id))
        .exec(&txn)
        .await?;

    users::Entity::update_many()
        .col_expr(
            users::Column::AvailableForWithdraw,
            Expr::col(users::Column::AvailableForWithdraw).add(total),
        )
        .filter(users::Column::Id.eq(run.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(
        "Credited {} chunk(s) ({}) to run {} for user {}",
        chunks, total, run.id, run.user_id
    );
    Ok(total)
}

/// Start a run for an active contract. At most one open run per contract.
pub async fn start_run(
    db: &DatabaseConnection,
    user_id: i64,
    contract_id: u64,
) -> ApiResult<run_sessions::Model> {
    let contract = contracts::Entity::find_by_id(contract_id)
        .filter(contracts::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Contract not found"))?;
    if contract.status != contracts::status::ACTIVE {
        return Err(ApiError::bad_request("Contract is not active"));
    }

    let open_run = run_sessions::Entity::find()
        .filter(run_sessions::Column::ContractId.eq(contract_id))
        .filter(run_sessions::Column::EndedAt.is_null())
        .one(db)
        .await?;
    if open_run.is_some() {
        return Err(ApiError::bad_request(
            "A run is already active for this contract",
        ));
    }

    let now = Utc::now();
    let run = run_sessions::ActiveModel {
        user_id: Set(user_id),
        contract_id: Set(contract_id),
        started_at: Set(now),
        last_heartbeat_at: Set(Some(now)),
        earnings_added: Set(Decimal::ZERO),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(run)
}

/// Record a heartbeat and credit any chunks that became due. Ends the run
/// once the 22h cap passes.
pub async fn heartbeat(db: &DatabaseConnection, user_id: i64, run_id: u64) -> ApiResult<RunTick> {
    let run = find_owned_run(db, user_id, run_id).await?;
    if run.ended_at.is_some() {
        return Ok(RunTick {
            run_id: run.id,
            active: false,
            ended: true,
            earnings_so_far: run.earnings_added,
        });
    }

    let contract = contracts::Entity::find_by_id(run.contract_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Contract not found"))?;

    let now = Utc::now();
    credit_due(db, &run, contract.amount, now).await?;
    let run = find_owned_run(db, user_id, run_id).await?;

    if now >= cap_end(run.started_at) {
        run_sessions::ActiveModel {
            id: Set(run.id),
            ended_at: Set(Some(now)),
            last_heartbeat_at: Set(Some(now)),
            ..Default::default()
        }
        .update(db)
        .await?;
        return Ok(RunTick {
            run_id: run.id,
            active: false,
            ended: true,
            earnings_so_far: run.earnings_added,
        });
    }

    run_sessions::ActiveModel {
        id: Set(run.id),
        last_heartbeat_at: Set(Some(now)),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(RunTick {
        run_id: run.id,
        active: true,
        ended: false,
        earnings_so_far: run.earnings_added,
    })
}

/// Stop a run, crediting everything due up to now (or the cap). Stopping an
/// already-ended run is a no-op that reports the final total.
pub async fn stop_run(db: &DatabaseConnection, user_id: i64, run_id: u64) -> ApiResult<Decimal> {
    let run = find_owned_run(db, user_id, run_id).await?;
    if run.ended_at.is_some() {
        return Ok(run.earnings_added);
    }

    let contract = contracts::Entity::find_by_id(run.contract_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Contract not found"))?;

    let now = Utc::now();
    credit_due(db, &run, contract.amount, now).await?;
    let run = find_owned_run(db, user_id, run_id).await?;
    run_sessions::ActiveModel {
        id: Set(run.id),
        ended_at: Set(Some(now)),
        last_heartbeat_at: Set(Some(now)),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(run.earnings_added)
}

/// End runs whose heartbeat went stale or whose cap passed. Abandoned runs
/// are credited only up to their last heartbeat so absent clients do not
/// keep accruing.
pub async fn sweep_stale(db: &DatabaseConnection) -> ApiResult<usize> {
    let now = Utc::now();
    let open_runs = run_sessions::Entity::find()
        .filter(run_sessions::Column::EndedAt.is_null())
        .all(db)
        .await?;

    let mut swept = 0;
    for run in open_runs {
        let last_seen = run.last_heartbeat_at.unwrap_or(run.started_at);
        let stale = now - last_seen > Duration::minutes(STALE_AFTER_MINUTES);
        let capped = now >= cap_end(run.started_at);
        if !stale && !capped {
            continue;
        }

        let contract = contracts::Entity::find_by_id(run.contract_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Contract not found"))?;
        credit_due(db, &run, contract.amount, last_seen).await?;
        run_sessions::ActiveModel {
            id: Set(run.id),
            ended_at: Set(Some(now)),
            ..Default::default()
        }
        .update(db)
        .await?;
        info!("Swept run {} (stale: {}, capped: {})", run.id, stale, capped);
        swept += 1;
    }
    Ok(swept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, h, m, 0).unwrap()
    }

    #[test]
    fn no_chunks_before_first_interval() {
        let started = at(8, 0);
        let (chunks, mark) = due_chunks(started, None, at(8, 9));
        assert_eq!(chunks, 0);
        assert_eq!(mark, started);
    }

    #[test]
    fn chunks_accrue_every_ten_minutes() {
        let started = at(8, 0);
        let (chunks, mark) = due_chunks(started, None, at(8, 35));
        assert_eq!(chunks, 3);
        assert_eq!(mark, at(8, 30));

        // Subsequent call resumes from the saved mark.
        let (chunks, mark) = due_chunks(started, Some(at(8, 30)), at(8, 52));
        assert_eq!(chunks, 2);
        assert_eq!(mark, at(8, 50));
    }

    #[test]
    fn accrual_stops_at_the_cap() {
        let started = at(0, 0);
        let cap = cap_end(started);
        assert_eq!(cap, at(22, 0));

        // Way past the cap: exactly 22h of chunks, no more.
        let (chunks, mark) = due_chunks(started, None, at(23, 59));
        assert_eq!(chunks, MAX_RUN_HOURS * 60 / CHUNK_MINUTES);
        assert_eq!(mark, cap);

        // Already fully credited: nothing further accrues.
        let (chunks, _) = due_chunks(started, Some(cap), at(23, 59));
        assert_eq!(chunks, 0);
    }

    #[test]
    fn stopping_credits_chunks_elapsed_since_last_save() {
        let started = at(8, 0);
        // Last credit landed at 8:30; the user stops at 8:57. The two full
        // chunks in between are still owed.
        let (chunks, mark) = due_chunks(started, Some(at(8, 30)), at(8, 57));
        assert_eq!(chunks, 2);
        assert_eq!(mark, at(8, 50));
    }

    #[test]
    fn advanced_mark_leaves_nothing_due() {
        let started = at(8, 0);
        let (chunks, mark) = due_chunks(started, None, at(8, 20));
        assert_eq!(chunks, 2);

        // A second pass over the same window, resuming from the mark the
        // first one claimed, finds nothing left to credit.
        let (chunks, mark_again) = due_chunks(started, Some(mark), at(8, 20));
        assert_eq!(chunks, 0);
        assert_eq!(mark_again, mark);
    }

    #[test]
    fn mark_never_moves_backwards() {
        let started = at(8, 0);
        let (chunks, mark) = due_chunks(started, Some(at(9, 0)), at(8, 30));
        assert_eq!(chunks, 0);
        assert_eq!(mark, at(9, 0));
    }

    #[test]
    fn chunk_amount_spreads_the_daily_rate() {
        // $1989 at 2%/day over 144 chunks, no jitter.
        let base = chunk_amount(Decimal::from(1989), 100);
        assert_eq!(base, Decimal::new(27625, 5)); // 0.27625

        // Jitter envelope scales linearly.
        assert_eq!(chunk_amount(Decimal::from(1989), 80), base * Decimal::new(8, 1));
        assert_eq!(chunk_amount(Decimal::from(1989), 120), base * Decimal::new(12, 1));
    }

    #[test]
    fn random_jitter_stays_in_envelope() {
        for _ in 0..200 {
            let pct = random_jitter_pct();
            assert!((80..=120).contains(&pct));
        }
    }
}
