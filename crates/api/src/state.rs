//! Shared application state for the Axum control plane.

use std::sync::Arc;

use sqlx::PgPool;

use herald_common::config::AppConfig;
use herald_engine::dispatcher::NotificationDispatcher;
use herald_engine::stores::UserStore;
use herald_relay::ChannelRelay;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: AppConfig,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub relay: Arc<ChannelRelay>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: AppConfig,
        dispatcher: Arc<NotificationDispatcher>,
        relay: Arc<ChannelRelay>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            pool,
            config,
            dispatcher,
            relay,
            users,
        }
    }
}
