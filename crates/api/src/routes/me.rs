//! Owner-only Telegram id routes.
//!
//! Users paste the id the bot echoed back at them (see the relay's
//! onboarding reply) so notifications can reach their chat.

use axum::extract::State;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use herald_common::error::AppError;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/me/telegram-id", put(set_telegram_id))
        .route("/api/me/telegram-id", get(get_telegram_id))
        .route("/api/me/telegram-id", delete(clear_telegram_id))
}

#[derive(Debug, Deserialize)]
struct SetTelegramIdRequest {
    telegram_id: i64,
}

/// PUT /api/me/telegram-id — link the caller's Telegram chat id.
async fn set_telegram_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SetTelegramIdRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .users
        .set_telegram_id(auth.uid, Some(req.telegram_id))
        .await?;
    Ok(Json(json!({ "saved": true })))
}

/// GET /api/me/telegram-id — the caller's linked id, or null.
async fn get_telegram_id(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let telegram_id = state.users.telegram_id(auth.uid).await?;
    Ok(Json(json!({ "telegram_id": telegram_id })))
}

/// DELETE /api/me/telegram-id — unlink the caller's id.
async fn clear_telegram_id(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    state.users.set_telegram_id(auth.uid, None).await?;
    Ok(Json(json!({ "saved": true })))
}
