//! Run session endpoints. The client heartbeats every couple of minutes;
//! the accrual itself happens server-side in `services::runs`.

use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use shared::entity::users;
use shared::models::{
    RunHeartbeatRequest, RunStartRequest, RunStartResponse, RunStatusResponse, RunStopRequest,
    RunStopResponse,
};

use crate::error::ApiResult;
use crate::services;
use crate::state::AppState;

/// POST /run/start
pub async fn start(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Json(req): Json<RunStartRequest>,
) -> ApiResult<Json<RunStartResponse>> {
    let run = services::runs::start_run(state.db.as_ref(), user.id, req.contract_id).await?;
    Ok(Json(RunStartResponse {
        run_id: run.id,
        started_at: run.started_at,
    }))
}

/// POST /run/heartbeat
pub async fn heartbeat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Json(req): Json<RunHeartbeatRequest>,
) -> ApiResult<Json<RunStatusResponse>> {
    let tick = services::runs::heartbeat(state.db.as_ref(), user.id, req.run_id).await?;
    Ok(Json(RunStatusResponse {
        run_id: tick.run_id,
        active: tick.active,
        ended: tick.ended,
        earnings_so_far: tick.earnings_so_far,
    }))
}

/// POST /run/stop
pub async fn stop(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<users::Model>,
    Json(req): Json<RunStopRequest>,
) -> ApiResult<Json<RunStopResponse>> {
    let earnings = services::runs::stop_run(state.db.as_ref(), user.id, req.run_id).await?;
    Ok(Json(RunStopResponse {
        message: "Run stopped".to_string(),
        earnings_added: earnings,
    }))
}
