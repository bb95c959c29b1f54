//! ForumHerald service binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use herald_common::config::AppConfig;
use herald_common::db::create_pool;
use herald_common::kv::KvStore;
use herald_common::types::ChannelConfig;
use herald_engine::dispatcher::{NotificationDispatcher, OutboundChannel};
use herald_engine::lang_cache::LanguageCache;
use herald_engine::resolver::LanguageResolver;
use herald_engine::sanitize::ContentSanitizer;
use herald_engine::stores::{PgPostStore, PgUserStore, UserStore};
use herald_engine::translate::HttpTranslator;
use herald_relay::ChannelRelay;

use herald_api::routes::admin::CHANNEL_CONFIG_KEY;
use herald_api::routes::create_router;
use herald_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("herald_api=debug,herald_engine=debug,herald_relay=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting ForumHerald...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Read the channel config once. Later updates to the stored config do
    // not touch the live connection; they take effect on the next start.
    let channel_config: Option<ChannelConfig> = KvStore::get(&pool, CHANNEL_CONFIG_KEY).await?;
    let relay = Arc::new(ChannelRelay::connect(channel_config.as_ref())?);

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let posts = Arc::new(PgPostStore::new(pool.clone()));

    // Cache capacity is derived from the user population once, here.
    let total_users = users.total_users().await.ok();
    let cache = Arc::new(LanguageCache::new(total_users));
    tracing::info!(
        capacity = LanguageCache::capacity_for(total_users),
        "Language cache ready"
    );

    let resolver = Arc::new(LanguageResolver::new(
        cache,
        Arc::clone(&users),
        config.default_lang.clone(),
    ));
    let sanitizer = Arc::new(ContentSanitizer::new(Arc::new(HttpTranslator::new(
        config.translator_url.clone(),
    ))));

    let dispatcher = Arc::new(NotificationDispatcher::new(
        resolver,
        sanitizer,
        Arc::clone(&users),
        posts,
        Arc::clone(&relay) as Arc<dyn OutboundChannel>,
        config.forum_base_url.clone(),
    ));

    // Inbound identification messages are only listened for while connected
    if relay.is_connected() {
        let listener_relay = Arc::clone(&relay);
        tokio::spawn(async move {
            listener_relay.run_listener().await;
            tracing::warn!("Telegram listener stopped");
        });
    }

    // Build application state and router
    let state = AppState::new(pool, config, dispatcher, relay, users);
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("ForumHerald stopped.");
    Ok(())
}
