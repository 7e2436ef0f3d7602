use super::args::*;

pub mod get;
pub mod put;
pub mod resolve;
pub mod status;

use crate::exit_codes::{BACKEND_FAILURE, INVALID_INPUT};
use logcache_core::LogCacheError;
use tracing::debug;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    debug!(command = ?cli.cmd, "dispatching");
    match cli.cmd {
        Command::Resolve(args) => resolve::cmd_resolve(args).await,
        Command::Get(args) => get::cmd_get(args).await,
        Command::Put(args) => put::cmd_put(args).await,
        Command::Status(args) => status::cmd_status(args).await,
    }
}

/// Exit code for a failed command.
pub(crate) fn error_exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<LogCacheError>() {
        Some(LogCacheError::Io { .. } | LogCacheError::Backend { .. } | LogCacheError::Store(_)) => {
            BACKEND_FAILURE
        }
        _ => INVALID_INPUT,
    }
}

pub(crate) fn report(result: anyhow::Result<i32>) -> anyhow::Result<i32> {
    match result {
        Ok(code) => Ok(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            Ok(error_exit_code(&e))
        }
    }
}
