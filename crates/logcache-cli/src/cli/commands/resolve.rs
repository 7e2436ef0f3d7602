//! `logcache resolve` - Expand references into log paths with etags.

use anyhow::Result;

use logcache_core::LogResolver;

use super::report;
use crate::cli::args::ResolveArgs;
use crate::exit_codes::SUCCESS;

pub async fn cmd_resolve(args: ResolveArgs) -> Result<i32> {
    report(run_resolve(&args).await)
}

async fn run_resolve(args: &ResolveArgs) -> Result<i32> {
    let resolver = LogResolver::default();
    let logs = resolver.resolve(&args.refs).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&logs)?);
    } else {
        for log in &logs {
            println!("{}\t{}", log.path, log.etag.as_deref().unwrap_or("-"));
        }
    }
    Ok(SUCCESS)
}
