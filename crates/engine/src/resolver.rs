//! Per-recipient language resolution.
//!
//! A live cache entry short-circuits with zero collaborator calls. Otherwise
//! the tiers below are tried in order and the winning value is cached before
//! returning:
//!
//! 1. stored user preference
//! 2. deployment default (`DEFAULT_LANG`)
//! 3. hard-coded fallback

use std::sync::Arc;

use crate::lang_cache::LanguageCache;
use crate::stores::UserStore;

/// Fallback when neither the user nor the deployment chose a language.
const FALLBACK_LANG: &str = "en_GB";

/// Resolves the language a notification should be rendered in.
pub struct LanguageResolver {
    cache: Arc<LanguageCache>,
    users: Arc<dyn UserStore>,
    default_lang: Option<String>,
}

impl LanguageResolver {
    pub fn new(
        cache: Arc<LanguageCache>,
        users: Arc<dyn UserStore>,
        default_lang: Option<String>,
    ) -> Self {
        Self {
            cache,
            users,
            default_lang,
        }
    }

    /// Resolve `uid`'s language. Total — a settings lookup error is treated
    /// the same as an absent preference and falls through the tiers.
    pub async fn resolve(&self, uid: i64) -> String {
        if let Some(language) = self.cache.get(uid) {
            return language;
        }

        let stored = self.users.language(uid).await.unwrap_or_else(|e| {
            tracing::debug!(uid, error = %e, "Settings lookup failed, falling through");
            None
        });

        let language = stored
            .or_else(|| self.default_lang.clone())
            .unwrap_or_else(|| FALLBACK_LANG.to_string());

        self.cache.insert(uid, language.clone());
        language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use herald_common::error::AppError;

    /// In-memory `UserStore` that counts settings lookups.
    struct FakeUsers {
        languages: HashMap<i64, String>,
        fail: bool,
        lookups: AtomicUsize,
    }

    impl FakeUsers {
        fn with_language(uid: i64, language: &str) -> Self {
            Self {
                languages: HashMap::from([(uid, language.to_string())]),
                fail: false,
                lookups: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                languages: HashMap::new(),
                fail: false,
                lookups: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                languages: HashMap::new(),
                fail: true,
                lookups: AtomicUsize::new(0),
            }
        }

        fn lookup_count(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserStore for FakeUsers {
        async fn language(&self, uid: i64) -> Result<Option<String>, AppError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Internal("settings store down".to_string()));
            }
            Ok(self.languages.get(&uid).cloned())
        }

        async fn telegram_id(&self, _uid: i64) -> Result<Option<i64>, AppError> {
            Ok(None)
        }

        async fn set_telegram_id(
            &self,
            _uid: i64,
            _telegram_id: Option<i64>,
        ) -> Result<(), AppError> {
            Ok(())
        }

        async fn total_users(&self) -> Result<i64, AppError> {
            Ok(0)
        }
    }

    fn resolver(users: Arc<FakeUsers>, default_lang: Option<&str>) -> LanguageResolver {
        LanguageResolver::new(
            Arc::new(LanguageCache::new(None)),
            users,
            default_lang.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_stored_preference_wins() {
        let users = Arc::new(FakeUsers::with_language(1, "es"));
        let resolver = resolver(Arc::clone(&users), Some("de"));

        assert_eq!(resolver.resolve(1).await, "es");
    }

    #[tokio::test]
    async fn test_cached_resolve_skips_settings_lookup() {
        let users = Arc::new(FakeUsers::with_language(1, "es"));
        let resolver = resolver(Arc::clone(&users), None);

        assert_eq!(resolver.resolve(1).await, "es");
        assert_eq!(resolver.resolve(1).await, "es");
        assert_eq!(resolver.resolve(1).await, "es");

        // Only the first resolve reaches the settings store
        assert_eq!(users.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_preference_uses_deployment_default() {
        let users = Arc::new(FakeUsers::empty());
        let resolver = resolver(Arc::clone(&users), Some("de"));

        assert_eq!(resolver.resolve(7).await, "de");
    }

    #[tokio::test]
    async fn test_lookup_error_falls_through_tiers() {
        let users = Arc::new(FakeUsers::failing());
        let resolver = resolver(Arc::clone(&users), Some("de"));

        // A failing settings store behaves like an absent preference
        assert_eq!(resolver.resolve(7).await, "de");
    }

    #[tokio::test]
    async fn test_hard_coded_fallback() {
        let users = Arc::new(FakeUsers::empty());
        let resolver = resolver(Arc::clone(&users), None);

        assert_eq!(resolver.resolve(7).await, "en_GB");
    }

    #[tokio::test]
    async fn test_fallback_value_is_cached() {
        let users = Arc::new(FakeUsers::empty());
        let resolver = resolver(Arc::clone(&users), None);

        assert_eq!(resolver.resolve(7).await, "en_GB");
        assert_eq!(resolver.resolve(7).await, "en_GB");
        assert_eq!(users.lookup_count(), 1);
    }
}
