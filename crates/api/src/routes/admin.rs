//! Administrative channel configuration routes.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use herald_common::error::AppError;
use herald_common::kv::KvStore;
use herald_common::types::ChannelConfig;
use herald_relay::template::MessageTemplate;

use crate::middleware::auth::AdminUser;
use crate::state::AppState;

/// Key the channel config is persisted under.
pub const CHANNEL_CONFIG_KEY: &str = "telegrambot-token";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/telegram", post(set_channel_config))
        .route("/api/admin/telegram", get(get_channel_config))
}

/// POST /api/admin/telegram — persist the bot token and onboarding template.
///
/// The live relay keeps its startup binding; a changed token takes effect on
/// the next restart.
async fn set_channel_config(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(config): Json<ChannelConfig>,
) -> Result<Json<serde_json::Value>, AppError> {
    if config.token.trim().is_empty() {
        return Err(AppError::Validation("Bot token must not be empty".to_string()));
    }

    if let Some(msg) = &config.msg {
        MessageTemplate::parse(msg).map_err(|e| match e {
            AppError::Config(reason) => AppError::Validation(reason),
            other => other,
        })?;
    }

    KvStore::set(&state.pool, CHANNEL_CONFIG_KEY, &config).await?;

    tracing::info!(uid = admin.uid, "Channel config updated");

    Ok(Json(json!({
        "saved": true,
        "restart_required": true
    })))
}

/// GET /api/admin/telegram — the stored config, or null when absent.
async fn get_channel_config(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Option<ChannelConfig>>, AppError> {
    let config = KvStore::get(&state.pool, CHANNEL_CONFIG_KEY).await?;
    Ok(Json(config))
}
