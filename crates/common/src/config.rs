use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Public base URL of the forum, used when composing permalinks
    pub forum_base_url: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Deployment-wide default language for users without a stored preference
    pub default_lang: Option<String>,

    /// Endpoint of the translation backend
    pub translator_url: String,

    /// Shared secret for validating forum-issued JWTs
    pub jwt_secret: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            forum_base_url: std::env::var("FORUM_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4567".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            default_lang: std::env::var("DEFAULT_LANG").ok(),
            translator_url: std::env::var("TRANSLATOR_URL")
                .unwrap_or_else(|_| "http://localhost:4567/api/translate".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
        })
    }
}
