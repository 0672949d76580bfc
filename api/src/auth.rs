use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use sea_orm::EntityTrait;
use shared::auth::decode_token;
use shared::entity::users;

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer-token middleware: decodes the JWT, loads the user and stores it
/// as a request extension. Banned users are cut off here.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = decode_token(token, &state.config.secret_key)
        .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;

    let user = users::Entity::find_by_id(claims.user_id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    if user.is_banned {
        return Err(ApiError::Forbidden("Account is banned".to_string()));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Operator endpoints: `X-Admin-Key` header must match `ADMIN_KEY`.
pub fn check_admin_key(state: &AppState, provided: Option<&str>) -> Result<(), ApiError> {
    match provided {
        Some(key) if !state.config.admin_key.is_empty() && key == state.config.admin_key => Ok(()),
        _ => Err(ApiError::Unauthorized("Invalid admin key".to_string())),
    }
}

/// Cron endpoints accept `CRON_KEY`, falling back to the admin key when no
/// dedicated cron key is configured.
pub fn check_cron_key(state: &AppState, provided: Option<&str>) -> Result<(), ApiError> {
    let expected = if state.config.cron_key.is_empty() {
        &state.config.admin_key
    } else {
        &state.config.cron_key
    };
    match provided {
        Some(key) if !expected.is_empty() && key == expected => Ok(()),
        _ => Err(ApiError::Unauthorized("Invalid key".to_string())),
    }
}
