//! Etag-validated cache for tabular data derived from eval log files.
//!
//! This crate provides:
//!
//! - Resolution of log references (files, directories, descriptors) into
//!   `(path, etag)` pairs, with backends routed by URL scheme
//! - An etag-gated cache of derived tables over any key-value store
//! - In-memory and SQLite key-value stores
//!
//! # Quick Start
//!
//! ```no_run
//! use logcache_core::{get_cached, put_cached, LogResolver, SqliteStore, Table};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = LogResolver::default();
//! let store = SqliteStore::open("logcache.db".as_ref())?;
//!
//! for log in resolver.resolve(["./logs"]).await? {
//!     let table = match get_cached(&store, &log.path, log.etag.as_deref()).await {
//!         Some(table) => table,
//!         None => {
//!             let table = Table::new(["sample_id"]); // parse the log here
//!             put_cached(&store, &log.path, log.etag.as_deref(), &table).await;
//!             table
//!         }
//!     };
//!     println!("{}: {} rows", log.path, table.num_rows());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `LOGCACHE_DB` | SQLite database path |
//! | `LOGCACHE_ABSENT_ETAG` | `match` (default) or `miss` for paths without etags |
//! | `LOGCACHE_DISABLED` | Bypass the cache |

pub mod cache;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod recognize;
pub mod reference;
pub mod resolver;
pub mod store;
pub mod table;
pub mod types;

pub use cache::{
    get_cached, get_cached_with, put_cached, AbsentEtagPolicy, CacheEntry, CacheLookup,
    CacheStats, LogCache, MissReason,
};
pub use config::CacheConfig;
pub use error::{LogCacheError, LogCacheResult, StoreError};
pub use filesystem::{FileSystem, Filesystems, LocalFileSystem, MemoryFileSystem};
pub use recognize::{EvalLogRecognizer, LogRecognizer, DEFAULT_LOG_FORMATS};
pub use reference::LogRef;
pub use resolver::{resolve_logs_with_etag, LogResolver};
pub use store::{KvStore, MemoryStore, SqliteStore};
pub use table::{ColumnType, Record, Scalar, Table, TableError};
pub use types::{FileInfo, FileType, LogInfo, ResolvedLog};
