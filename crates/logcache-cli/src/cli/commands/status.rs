//! `logcache status` - Resolve logs and report the cache state of each.

use anyhow::Result;

use logcache_core::{CacheLookup, LogCache, LogResolver};

use super::report;
use crate::cli::args::StatusArgs;
use crate::exit_codes::SUCCESS;

pub async fn cmd_status(args: StatusArgs) -> Result<i32> {
    report(run_status(&args).await)
}

async fn run_status(args: &StatusArgs) -> Result<i32> {
    let logs = LogResolver::default().resolve(&args.refs).await?;

    let config = args.store.config()?;
    let store = config.open_store()?;
    let cache = LogCache::with_config(store, config);

    for log in &logs {
        let state = match cache.lookup(&log.path, log.etag.as_deref()).await {
            CacheLookup::Hit(table) => format!("hit:{}", table.num_rows()),
            CacheLookup::Miss(reason) => reason.to_string(),
        };
        println!("{}\t{}", state, log.path);
    }

    let stats = cache.stats();
    eprintln!(
        "{} logs: {} cached, {} to load",
        logs.len(),
        stats.hits,
        stats.misses
    );
    Ok(SUCCESS)
}
