//! Cache configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cache::AbsentEtagPolicy;
use crate::error::{LogCacheError, LogCacheResult};
use crate::store::SqliteStore;

/// Cache configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// SQLite database path for the persistent store.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Treatment of absent stored and current etags.
    #[serde(default)]
    pub absent_etag: AbsentEtagPolicy,

    /// Bypass the cache entirely.
    #[serde(default)]
    pub disabled: bool,
}

impl CacheConfig {
    /// Configuration from environment variables.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `LOGCACHE_DB` | SQLite database path |
    /// | `LOGCACHE_ABSENT_ETAG` | `match` (default) or `miss` |
    /// | `LOGCACHE_DISABLED` | `1`/`true` to bypass the cache |
    pub fn from_env() -> LogCacheResult<Self> {
        let absent_etag = match std::env::var("LOGCACHE_ABSENT_ETAG") {
            Ok(v) => v
                .parse()
                .map_err(|message| LogCacheError::Config { message })?,
            Err(_) => AbsentEtagPolicy::default(),
        };

        Ok(Self {
            db_path: std::env::var_os("LOGCACHE_DB").map(PathBuf::from),
            absent_etag,
            disabled: std::env::var("LOGCACHE_DISABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// Set the database path.
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Set the absent-etag policy.
    pub fn with_absent_etag(mut self, policy: AbsentEtagPolicy) -> Self {
        self.absent_etag = policy;
        self
    }

    /// Disable or enable the cache.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Open the configured SQLite store, or an in-memory one if no path is set.
    pub fn open_store(&self) -> LogCacheResult<SqliteStore> {
        let store = match &self.db_path {
            Some(path) => SqliteStore::open(path)?,
            None => SqliteStore::memory()?,
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_builders() {
        let config = CacheConfig::default()
            .with_db_path("/tmp/cache.db")
            .with_absent_etag(AbsentEtagPolicy::Miss)
            .with_disabled(true);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/cache.db")));
        assert_eq!(config.absent_etag, AbsentEtagPolicy::Miss);
        assert!(config.disabled);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{"absent_etag": "miss"}"#).unwrap();
        assert_eq!(config.absent_etag, AbsentEtagPolicy::Miss);
        assert!(config.db_path.is_none());
        assert!(!config.disabled);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("LOGCACHE_DB", "/tmp/logcache-test.db");
        std::env::set_var("LOGCACHE_ABSENT_ETAG", "miss");
        std::env::set_var("LOGCACHE_DISABLED", "TRUE");
        let config = CacheConfig::from_env().unwrap();
        std::env::remove_var("LOGCACHE_DB");
        std::env::remove_var("LOGCACHE_ABSENT_ETAG");
        std::env::remove_var("LOGCACHE_DISABLED");

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/logcache-test.db")));
        assert_eq!(config.absent_etag, AbsentEtagPolicy::Miss);
        assert!(config.disabled);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_policy() {
        std::env::set_var("LOGCACHE_ABSENT_ETAG", "sometimes");
        let result = CacheConfig::from_env();
        std::env::remove_var("LOGCACHE_ABSENT_ETAG");
        assert!(matches!(result, Err(LogCacheError::Config { .. })));
    }

    #[test]
    fn test_open_store_at_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.db");
        let config = CacheConfig::default().with_db_path(&path);
        config.open_store().unwrap();
        assert!(path.exists());
    }
}
