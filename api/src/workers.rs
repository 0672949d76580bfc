//! Background loops: the run sweeper and the contract refund sweep. Both
//! run on a plain tokio interval; errors are logged and the loop keeps going.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::services;
use crate::state::AppState;

const RUN_SWEEP_SECS: u64 = 60;
const REFUND_SWEEP_SECS: u64 = 15 * 60;

pub fn spawn(state: Arc<AppState>) {
    tokio::spawn(run_sweeper(state.clone()));
    tokio::spawn(refund_sweeper(state));
}

async fn run_sweeper(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(RUN_SWEEP_SECS));
    loop {
        interval.tick().await;
        match services::runs::sweep_stale(state.db.as_ref()).await {
            Ok(0) => {}
            Ok(n) => info!("Run sweeper ended {} stale run(s)", n),
            Err(e) => error!("Run sweeper failed: {}", e),
        }
    }
}

async fn refund_sweeper(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(REFUND_SWEEP_SECS));
    loop {
        interval.tick().await;
        match services::refunds::process_refunds(&state).await {
            Ok(0) => {}
            Ok(n) => info!("Refund sweep processed {} contract(s)", n),
            Err(e) => error!("Refund sweep failed: {}", e),
        }
    }
}
