use std::sync::Arc;

use anyhow::Result;
use axum::routing::{delete, get, post, put};
use axum::{middleware, Json, Router};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod auth;
mod error;
mod handlers;
mod services;
mod state;
mod workers;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting ContractDesk API server...");

    let state = Arc::new(AppState::new().await?);
    migration::Migrator::up(state.db.as_ref(), None).await?;
    info!("Migrations applied");

    workers::spawn(state.clone());

    let protected = Router::new()
        .route("/contracts/options", get(handlers::contracts::options))
        .route("/buy", post(handlers::contracts::buy))
        .route("/contracts", get(handlers::contracts::list))
        .route("/contracts/:id/stop", post(handlers::contracts::stop))
        .route("/dashboard", get(handlers::contracts::dashboard))
        .route(
            "/wallets",
            get(handlers::wallets::list).post(handlers::wallets::add),
        )
        .route("/wallets/default", put(handlers::wallets::set_default))
        .route("/wallets/:id", delete(handlers::wallets::remove))
        .route("/withdraw", post(handlers::withdrawals::withdraw))
        .route("/withdrawals/history", get(handlers::withdrawals::history))
        .route("/run/start", post(handlers::runs::start))
        .route("/run/heartbeat", post(handlers::runs::heartbeat))
        .route("/run/stop", post(handlers::runs::stop))
        .route("/account/management", post(handlers::account::management))
        .route("/telegram/link", post(handlers::account::telegram_link))
        .route(
            "/trading-accounts",
            get(handlers::trading::list).post(handlers::trading::create),
        )
        .route(
            "/trading-accounts/:id/balance",
            get(handlers::trading::balance),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/reset-pin", post(handlers::auth::reset_pin))
        .route(
            "/webhooks/cryptomus",
            post(handlers::withdrawals::cryptomus_webhook),
        )
        .route("/outbound-ip", get(handlers::admin::outbound_ip))
        .route(
            "/cron/process-refunds",
            get(handlers::admin::process_refunds),
        )
        .route(
            "/admin/create-pin-reset",
            post(handlers::admin::create_pin_reset),
        )
        .route(
            "/admin/permission-codes",
            post(handlers::admin::create_permission_codes),
        )
        .route(
            "/admin/contracts/:id/activate",
            post(handlers::admin::activate_contract),
        )
        .route(
            "/admin/account-payments/:id/verify",
            post(handlers::admin::verify_account_payment),
        )
        .route("/admin/users/:id/ban", post(handlers::admin::ban_user))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    let addr = format!("0.0.0.0:{}", state.config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
