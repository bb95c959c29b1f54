//! Inbound notification events from the forum's notification system.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use herald_common::error::AppError;
use herald_common::types::NotificationEvent;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/notifications/push", post(push_notification))
}

/// POST /api/notifications/push — accept an event and fan it out.
///
/// The fan-out runs detached; this endpoint acknowledges receipt and never
/// reports delivery results.
async fn push_notification(
    State(state): State<AppState>,
    Json(event): Json<NotificationEvent>,
) -> Result<Json<serde_json::Value>, AppError> {
    if event.uids.is_empty() {
        return Err(AppError::Validation(
            "Event must address at least one recipient".to_string(),
        ));
    }

    tracing::debug!(recipients = event.uids.len(), "Notification event accepted");

    let dispatcher = Arc::clone(&state.dispatcher);
    tokio::spawn(async move {
        dispatcher.dispatch(event).await;
    });

    Ok(Json(json!({ "accepted": true })))
}
