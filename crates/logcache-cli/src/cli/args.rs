use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use logcache_core::{AbsentEtagPolicy, CacheConfig, LogCacheResult};

#[derive(Parser)]
#[command(
    name = "logcache",
    version,
    about = "Etag-validated cache for tables derived from eval log files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve log files and directories to paths with etags
    Resolve(ResolveArgs),
    /// Print the cached records for a log path
    Get(GetArgs),
    /// Cache records for a log path
    Put(PutArgs),
    /// Resolve logs and report their cache state
    Status(StatusArgs),
}

/// Store selection shared by the cache commands.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// SQLite cache database
    #[arg(long, env = "LOGCACHE_DB")]
    pub db: Option<PathBuf>,

    /// Treat logs without etags as never cached
    #[arg(long)]
    pub strict_etag: bool,
}

impl StoreArgs {
    /// Environment configuration with flag overrides applied.
    pub fn config(&self) -> LogCacheResult<CacheConfig> {
        let mut config = CacheConfig::from_env()?;
        if let Some(db) = &self.db {
            config = config.with_db_path(db);
        }
        if self.strict_etag {
            config = config.with_absent_etag(AbsentEtagPolicy::Miss);
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Log files or directories
    #[arg(required = true)]
    pub refs: Vec<String>,

    /// Print JSON instead of tab-separated lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Log path (cache key)
    pub path: String,

    /// Current etag of the log
    #[arg(long)]
    pub etag: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct PutArgs {
    /// Log path (cache key)
    pub path: String,

    /// JSON file holding an array of row objects
    #[arg(long)]
    pub records: PathBuf,

    /// Etag the records were derived from
    #[arg(long)]
    pub etag: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Log files or directories
    #[arg(required = true)]
    pub refs: Vec<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}
