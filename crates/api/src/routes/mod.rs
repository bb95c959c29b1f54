pub mod admin;
pub mod health;
pub mod me;
pub mod nav;
pub mod notifications;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(notifications::router())
        .merge(admin::router())
        .merge(me::router())
        .merge(nav::router())
        .with_state(state)
}
