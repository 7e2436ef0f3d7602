//! Log resolution.
//!
//! Expands references into recognized log files, each paired with the etag
//! its backend reported:
//! 1. Normalize each reference to a path string
//! 2. Stat it; directories are listed recursively, keeping files only
//! 3. Recognize log files (unsorted)
//! 4. Attach etags from the listings

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::LogCacheResult;
use crate::filesystem::Filesystems;
use crate::recognize::{EvalLogRecognizer, LogRecognizer};
use crate::reference::LogRef;
use crate::types::{FileInfo, ResolvedLog};

/// Resolves log references against registered backends.
#[derive(Clone)]
pub struct LogResolver {
    filesystems: Filesystems,
    recognizer: Arc<dyn LogRecognizer>,
}

impl Default for LogResolver {
    fn default() -> Self {
        Self::new(Filesystems::new())
    }
}

impl std::fmt::Debug for LogResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogResolver")
            .field("filesystems", &self.filesystems)
            .finish_non_exhaustive()
    }
}

impl LogResolver {
    /// Resolver using the default eval log recognizer.
    pub fn new(filesystems: Filesystems) -> Self {
        Self {
            filesystems,
            recognizer: Arc::new(EvalLogRecognizer::default()),
        }
    }

    /// Replace the log recognizer.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn LogRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn filesystems(&self) -> &Filesystems {
        &self.filesystems
    }

    /// Resolve references to `(path, etag)` pairs.
    ///
    /// Accepts any iterable of references; wrap a single one as `[r]` or use
    /// [`LogResolver::resolve_one`]. Backend failures propagate; no partial
    /// result is returned.
    pub async fn resolve<I>(&self, refs: I) -> LogCacheResult<Vec<ResolvedLog>>
    where
        I: IntoIterator,
        I::Item: Into<LogRef>,
    {
        let paths: Vec<String> = refs
            .into_iter()
            .map(|r| Into::<LogRef>::into(r).normalize())
            .collect();

        let mut files: Vec<FileInfo> = Vec::new();
        for path in &paths {
            files.extend(self.expand(path).await?);
        }

        let logs = self.recognizer.recognize(&files, false);

        let etags: HashMap<&str, Option<&String>> = files
            .iter()
            .map(|f| (f.name.as_str(), f.etag.as_ref()))
            .collect();

        let resolved: Vec<ResolvedLog> = logs
            .into_iter()
            .map(|log| {
                let etag = etags.get(log.name.as_str()).copied().flatten().cloned();
                ResolvedLog::new(log.name, etag)
            })
            .collect();

        info!(
            references = paths.len(),
            files = files.len(),
            logs = resolved.len(),
            "resolved logs"
        );
        Ok(resolved)
    }

    /// Resolve a single reference.
    pub async fn resolve_one(&self, r: impl Into<LogRef>) -> LogCacheResult<Vec<ResolvedLog>> {
        self.resolve(std::iter::once::<LogRef>(r.into())).await
    }

    /// Files under a single normalized path.
    async fn expand(&self, path: &str) -> LogCacheResult<Vec<FileInfo>> {
        let fs = self.filesystems.for_path(path)?;
        let info = fs.info(path).await?;

        if info.is_dir() {
            let files: Vec<FileInfo> = fs
                .ls(&info.name, true)
                .await?
                .into_iter()
                .filter(FileInfo::is_file)
                .collect();
            debug!(path, files = files.len(), "expanded directory");
            Ok(files)
        } else {
            debug!(path, etag = ?info.etag, "resolved file");
            Ok(vec![info])
        }
    }
}

/// Resolve with the default recognizer.
pub async fn resolve_logs_with_etag<I>(
    filesystems: &Filesystems,
    refs: I,
) -> LogCacheResult<Vec<ResolvedLog>>
where
    I: IntoIterator,
    I::Item: Into<LogRef>,
{
    LogResolver::new(filesystems.clone()).resolve(refs).await
}
