//! Navigation/profile surface entries and the user-facing settings data.
//!
//! Entries only appear while a channel config was loaded at startup; an
//! inert relay keeps the whole surface hidden.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use herald_common::error::AppError;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/nav", get(nav_entries))
        .route("/api/telegram/settings", get(telegram_settings))
}

/// GET /api/nav — profile and admin menu entries for the forum to render.
async fn nav_entries(State(state): State<AppState>) -> Json<serde_json::Value> {
    if !state.relay.is_connected() {
        return Json(json!({ "profile": [], "admin": [] }));
    }

    Json(json!({
        "profile": [{
            "id": "telegram",
            "route": "/telegram/settings",
            "icon": "fa-mobile",
            "name": "Telegram",
            "public": false
        }],
        "admin": [{
            "route": "/admin/telegram",
            "icon": "fa-paper-plane",
            "name": "Telegram Notifications"
        }]
    }))
}

/// GET /api/telegram/settings — data for the user settings page.
async fn telegram_settings(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.relay.is_connected() {
        return Err(AppError::NotFound("Telegram relay is not configured".to_string()));
    }

    let bot_username = state.relay.bot_username().await;
    Ok(Json(json!({ "bot_username": bot_username })))
}
