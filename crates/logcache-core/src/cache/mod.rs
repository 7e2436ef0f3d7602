//! Etag-gated table cache.
//!
//! Each log path maps to one store entry holding the table derived from that
//! log and the etag it was derived from. A read is a hit only if the stored
//! etag equals the current one and the stored table is non-empty.
//!
//! The cache never fails its caller: unreadable, corrupt, stale or empty
//! entries are misses, and failed writes are dropped.
//!
//! # Layout
//!
//! ```text
//! key   = <log path>
//! value = {"etag": <string|null>, "records": [<row object>, ...]}
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::config::CacheConfig;
use crate::store::KvStore;
use crate::table::Table;

mod entry;
mod policy;
mod read;
mod write;

pub use entry::CacheEntry;
pub use policy::AbsentEtagPolicy;

/// Why a lookup produced no table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// No entry under the key.
    Absent,
    /// The store failed to read.
    Unreadable,
    /// Stored value is not a well-formed entry.
    Corrupt,
    /// Stored etag differs from the current one.
    Stale,
    /// Entry holds zero records.
    Empty,
    /// Cache bypassed by configuration.
    Disabled,
}

impl std::fmt::Display for MissReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Absent => "absent",
            Self::Unreadable => "unreadable",
            Self::Corrupt => "corrupt",
            Self::Stale => "stale",
            Self::Empty => "empty",
            Self::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Table),
    Miss(MissReason),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn miss_reason(&self) -> Option<MissReason> {
        match self {
            Self::Hit(_) => None,
            Self::Miss(reason) => Some(*reason),
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Self::Hit(table) => Some(table),
            Self::Miss(_) => None,
        }
    }
}

/// Cached table for `path`, if one exists for `current_etag`.
///
/// Absent etags on both sides count as a match; use [`get_cached_with`] or
/// [`LogCache`] to choose otherwise.
pub async fn get_cached<S: KvStore + ?Sized>(
    store: &S,
    path: &str,
    current_etag: Option<&str>,
) -> Option<Table> {
    get_cached_with(store, path, current_etag, AbsentEtagPolicy::Match).await
}

/// [`get_cached`] with an explicit absent-etag policy.
pub async fn get_cached_with<S: KvStore + ?Sized>(
    store: &S,
    path: &str,
    current_etag: Option<&str>,
    policy: AbsentEtagPolicy,
) -> Option<Table> {
    read::lookup_impl(store, path, current_etag, policy)
        .await
        .into_table()
}

/// Store `table` for `path` under `etag`, replacing any prior entry.
///
/// Best-effort: serialization and store failures are logged and dropped.
pub async fn put_cached<S: KvStore + ?Sized>(
    store: &S,
    path: &str,
    etag: Option<&str>,
    table: &Table,
) {
    write::put_impl(store, path, etag, table).await;
}

/// Counters for a [`LogCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Writes that reached the store.
    pub writes: u64,
}

/// Store-backed cache with configuration and counters.
#[derive(Debug)]
pub struct LogCache<S> {
    store: S,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

impl<S: KvStore> LogCache<S> {
    /// Cache over `store` with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    pub fn with_config(store: S, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up `path`, reporting why a miss happened.
    pub async fn lookup(&self, path: &str, current_etag: Option<&str>) -> CacheLookup {
        let result = if self.config.disabled {
            CacheLookup::Miss(MissReason::Disabled)
        } else {
            read::lookup_impl(&self.store, path, current_etag, self.config.absent_etag).await
        };

        let counter = if result.is_hit() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        result
    }

    /// Cached table for `path`, if valid for `current_etag`.
    pub async fn get(&self, path: &str, current_etag: Option<&str>) -> Option<Table> {
        self.lookup(path, current_etag).await.into_table()
    }

    /// Store `table` for `path`. Best-effort.
    pub async fn put(&self, path: &str, etag: Option<&str>, table: &Table) {
        if self.config.disabled {
            return;
        }
        if write::put_impl(&self.store, path, etag, table).await {
            self.writes.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Cached table for `path`, or the loader's table, which is then cached.
    ///
    /// Loader errors propagate; cache failures never do.
    pub async fn get_or_load<F, Fut, E>(
        &self,
        path: &str,
        current_etag: Option<&str>,
        loader: F,
    ) -> Result<Table, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Table, E>>,
    {
        match self.lookup(path, current_etag).await {
            CacheLookup::Hit(table) => Ok(table),
            CacheLookup::Miss(reason) => {
                debug!(path, %reason, "loading from source");
                let table = loader().await?;
                self.put(path, current_etag, &table).await;
                Ok(table)
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}
