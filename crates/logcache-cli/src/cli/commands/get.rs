//! `logcache get` - Print cached records for a log path.

use anyhow::Result;

use logcache_core::{CacheLookup, LogCache};

use super::report;
use crate::cli::args::GetArgs;
use crate::exit_codes::{CACHE_MISS, SUCCESS};

pub async fn cmd_get(args: GetArgs) -> Result<i32> {
    report(run_get(&args).await)
}

async fn run_get(args: &GetArgs) -> Result<i32> {
    let config = args.store.config()?;
    let store = config.open_store()?;
    let cache = LogCache::with_config(store, config);

    match cache.lookup(&args.path, args.etag.as_deref()).await {
        CacheLookup::Hit(table) => {
            let records = table.to_records()?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(SUCCESS)
        }
        CacheLookup::Miss(reason) => {
            eprintln!("miss ({}): {}", reason, args.path);
            Ok(CACHE_MISS)
        }
    }
}
