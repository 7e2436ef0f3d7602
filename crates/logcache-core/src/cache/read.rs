//! Cache read path.

use tracing::{debug, warn};

use crate::store::KvStore;
use crate::table::Table;

use super::entry::CacheEntry;
use super::policy::AbsentEtagPolicy;
use super::{CacheLookup, MissReason};

pub(crate) async fn lookup_impl<S: KvStore + ?Sized>(
    store: &S,
    path: &str,
    current_etag: Option<&str>,
    policy: AbsentEtagPolicy,
) -> CacheLookup {
    let blob = match store.get(path).await {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            debug!(path, "not in cache");
            return CacheLookup::Miss(MissReason::Absent);
        }
        Err(e) => {
            warn!(path, error = %e, "cache read failed");
            return CacheLookup::Miss(MissReason::Unreadable);
        }
    };

    let entry = match CacheEntry::decode(&blob) {
        Ok(entry) => entry,
        Err(e) => {
            warn!(path, error = %e, "ignoring corrupt cache entry");
            return CacheLookup::Miss(MissReason::Corrupt);
        }
    };

    if !policy.matches(entry.etag.as_deref(), current_etag) {
        debug!(
            path,
            cached = ?entry.etag,
            current = ?current_etag,
            "cache entry stale"
        );
        return CacheLookup::Miss(MissReason::Stale);
    }

    if entry.records.is_empty() {
        debug!(path, "cache entry empty");
        return CacheLookup::Miss(MissReason::Empty);
    }

    let table = Table::from_records(entry.records);
    debug!(path, rows = table.num_rows(), "cache hit");
    CacheLookup::Hit(table)
}
