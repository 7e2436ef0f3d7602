//! Cache write path. Best-effort: failures are logged and dropped.

use tracing::{debug, warn};

use crate::store::KvStore;
use crate::table::Table;

use super::entry::{CacheEntry, CacheError};

pub(crate) async fn put_impl<S: KvStore + ?Sized>(
    store: &S,
    path: &str,
    etag: Option<&str>,
    table: &Table,
) -> bool {
    let blob = match CacheEntry::from_table(etag, table).and_then(|entry| entry.encode()) {
        Ok(blob) => blob,
        Err(e) => {
            log_dropped(path, &e);
            return false;
        }
    };

    match store.put(path, &blob).await {
        Ok(()) => {
            debug!(path, etag, rows = table.num_rows(), "cached table");
            true
        }
        Err(e) => {
            warn!(path, error = %e, "cache write failed");
            false
        }
    }
}

fn log_dropped(path: &str, err: &CacheError) {
    warn!(path, error = %err, "table not cacheable, skipping write");
}
