//! `logcache put` - Cache a JSON array of row objects for a log path.

use anyhow::{Context, Result};
use std::fs;

use logcache_core::{LogCache, LogCacheError, Record, Table};

use super::report;
use crate::cli::args::PutArgs;
use crate::exit_codes::{CACHE_MISS, SUCCESS};

pub async fn cmd_put(args: PutArgs) -> Result<i32> {
    report(run_put(&args).await)
}

async fn run_put(args: &PutArgs) -> Result<i32> {
    let content = fs::read_to_string(&args.records)
        .with_context(|| format!("failed to read records file: {}", args.records.display()))?;
    let records: Vec<Record> = serde_json::from_str(&content).with_context(|| {
        format!(
            "records file must hold an array of objects: {}",
            args.records.display()
        )
    })?;
    let table = Table::from_records(records);

    let config = args.store.config()?;
    if config.db_path.is_none() {
        return Err(LogCacheError::Config {
            message: "put needs a cache database (--db or LOGCACHE_DB)".to_string(),
        }
        .into());
    }
    let store = config.open_store()?;
    let cache = LogCache::with_config(store, config);
    cache.put(&args.path, args.etag.as_deref(), &table).await;

    if cache.stats().writes == 0 {
        eprintln!("write dropped: {}", args.path);
        return Ok(CACHE_MISS);
    }
    eprintln!("cached {} rows: {}", table.num_rows(), args.path);
    Ok(SUCCESS)
}
