//! Storage backends consulted by the resolver.
//!
//! A backend answers two questions about a path: what is it (`info`), and what
//! is under it (`ls`). Object-store backends report an etag per file; the local
//! backend never does.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{LogCacheError, LogCacheResult};
use crate::types::{FileInfo, FileType};

/// A storage backend providing stat and list.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Describe a single path.
    async fn info(&self, path: &str) -> LogCacheResult<FileInfo>;

    /// List entries under a directory. With `recursive`, descend into
    /// subdirectories; directory entries themselves are included.
    async fn ls(&self, path: &str, recursive: bool) -> LogCacheResult<Vec<FileInfo>>;
}

/// Split `scheme://rest` into its scheme, if any.
pub fn url_scheme(path: &str) -> Option<&str> {
    let (scheme, _) = path.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Routes paths to backends by URL scheme.
///
/// Paths without a scheme, and `file://` URLs, go to the local backend.
#[derive(Clone)]
pub struct Filesystems {
    local: Arc<dyn FileSystem>,
    by_scheme: HashMap<String, Arc<dyn FileSystem>>,
}

impl Default for Filesystems {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Filesystems {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemes: Vec<_> = self.by_scheme.keys().collect();
        schemes.sort();
        f.debug_struct("Filesystems")
            .field("schemes", &schemes)
            .finish()
    }
}

impl Filesystems {
    /// Router with only the local backend.
    pub fn new() -> Self {
        Self {
            local: Arc::new(LocalFileSystem),
            by_scheme: HashMap::new(),
        }
    }

    /// Replace the backend used for scheme-less paths.
    pub fn with_local(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.local = fs;
        self
    }

    /// Register a backend for `scheme://` paths.
    pub fn with_scheme(mut self, scheme: impl Into<String>, fs: Arc<dyn FileSystem>) -> Self {
        self.by_scheme.insert(scheme.into(), fs);
        self
    }

    /// Backend responsible for `path`.
    pub fn for_path(&self, path: &str) -> LogCacheResult<&dyn FileSystem> {
        match url_scheme(path) {
            None | Some("file") => Ok(self.local.as_ref()),
            Some(scheme) => self
                .by_scheme
                .get(scheme)
                .map(|fs| fs.as_ref())
                .ok_or_else(|| LogCacheError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                    path: path.to_string(),
                }),
        }
    }
}

/// Local disk backend. Never reports etags.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    fn local_path(path: &str) -> PathBuf {
        PathBuf::from(path.strip_prefix("file://").unwrap_or(path))
    }

    /// `path` without trailing slashes, keeping a bare root as `/`.
    fn dir_root(path: &str) -> String {
        let (scheme, rest) = match path.strip_prefix("file://") {
            Some(rest) => ("file://", rest),
            None => ("", path),
        };
        match rest.trim_end_matches('/') {
            "" if rest.starts_with('/') => format!("{}/", scheme),
            trimmed => format!("{}{}", scheme, trimmed),
        }
    }

    fn child_name(dir: &str, entry: &str) -> String {
        if dir.ends_with('/') {
            format!("{}{}", dir, entry)
        } else {
            format!("{}/{}", dir, entry)
        }
    }

    fn describe(name: String, meta: &std::fs::Metadata) -> FileInfo {
        let file_type = if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        };
        FileInfo {
            name,
            file_type,
            size: if meta.is_dir() { 0 } else { meta.len() },
            mtime: meta.modified().ok().map(DateTime::<Utc>::from),
            etag: None,
        }
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn info(&self, path: &str) -> LogCacheResult<FileInfo> {
        let local = Self::local_path(path);
        let meta = fs::metadata(&local)
            .await
            .map_err(|e| LogCacheError::io(path, e))?;
        Ok(Self::describe(path.to_string(), &meta))
    }

    async fn ls(&self, path: &str, recursive: bool) -> LogCacheResult<Vec<FileInfo>> {
        let root = Self::dir_root(path);
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![root];

        while let Some(dir) = pending.pop() {
            // Symlinked directories can form cycles.
            if let Ok(real) = fs::canonicalize(Self::local_path(&dir)).await {
                if !visited.insert(real) {
                    continue;
                }
            }

            let mut entries = fs::read_dir(Self::local_path(&dir))
                .await
                .map_err(|e| LogCacheError::io(dir.as_str(), e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| LogCacheError::io(dir.as_str(), e))?
            {
                let name = Self::child_name(&dir, &entry.file_name().to_string_lossy());
                let mut meta = entry
                    .metadata()
                    .await
                    .map_err(|e| LogCacheError::io(name.as_str(), e))?;
                if meta.file_type().is_symlink() {
                    // Dangling links keep their own metadata.
                    if let Ok(target) = fs::metadata(entry.path()).await {
                        meta = target;
                    }
                }
                let info = Self::describe(name, &meta);
                if recursive && info.is_dir() {
                    pending.push(info.name.clone());
                }
                out.push(info);
            }
        }

        out.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(path, entries = out.len(), "listed local directory");
        Ok(out)
    }
}

/// In-memory object-store backend keyed by full object name.
///
/// Directories are implied by `/`-separated prefixes, as in an object store.
/// Every object carries an etag, which changes on each overwrite.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    objects: RwLock<BTreeMap<String, FileInfo>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object. A fresh etag is derived from a
    /// per-object version counter unless `etag` is given.
    pub async fn put_object(&self, name: &str, size: u64, etag: Option<&str>) -> FileInfo {
        let mut objects = self.objects.write().await;
        let version = objects
            .get(name)
            .and_then(|o| o.etag.as_deref())
            .and_then(|e| e.trim_matches('"').rsplit('-').next())
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(1, |v| v + 1);
        let etag = etag
            .map(String::from)
            .unwrap_or_else(|| format!("\"{}-{}\"", size, version));
        let info = FileInfo::file(name)
            .with_size(size)
            .with_mtime(Utc::now())
            .with_etag(etag);
        objects.insert(name.to_string(), info.clone());
        info
    }

    pub async fn remove_object(&self, name: &str) -> bool {
        self.objects.write().await.remove(name).is_some()
    }

    fn dir_prefix(path: &str) -> String {
        format!("{}/", path.trim_end_matches('/'))
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn info(&self, path: &str) -> LogCacheResult<FileInfo> {
        let objects = self.objects.read().await;
        if let Some(info) = objects.get(path) {
            return Ok(info.clone());
        }
        let prefix = Self::dir_prefix(path);
        if objects.keys().any(|k| k.starts_with(&prefix)) {
            return Ok(FileInfo::directory(path.trim_end_matches('/')));
        }
        Err(LogCacheError::NotFound {
            path: path.to_string(),
        })
    }

    async fn ls(&self, path: &str, recursive: bool) -> LogCacheResult<Vec<FileInfo>> {
        let objects = self.objects.read().await;
        let prefix = Self::dir_prefix(path);
        let mut dirs = std::collections::BTreeSet::new();
        let mut out = Vec::new();

        for (name, info) in objects.range(prefix.clone()..) {
            let Some(rest) = name.strip_prefix(&prefix) else {
                break;
            };
            let mut segments: Vec<&str> = rest.split('/').collect();
            segments.pop();
            let depth = if recursive { segments.len() } else { segments.len().min(1) };
            for i in 1..=depth {
                dirs.insert(format!("{}{}", prefix, segments[..i].join("/")));
            }
            if recursive || segments.is_empty() {
                out.push(info.clone());
            }
        }

        if out.is_empty() && dirs.is_empty() {
            return Err(LogCacheError::NotFound {
                path: path.to_string(),
            });
        }
        out.extend(dirs.into_iter().map(FileInfo::directory));
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_url_scheme() {
        assert_eq!(url_scheme("s3://bucket/key"), Some("s3"));
        assert_eq!(url_scheme("file:///tmp/x"), Some("file"));
        assert_eq!(url_scheme("/tmp/x"), None);
        assert_eq!(url_scheme("logs/a b://c"), None);
    }

    #[test]
    fn test_router_unknown_scheme() {
        let router = Filesystems::new();
        let err = router.for_path("gs://bucket/x.eval").err().unwrap();
        assert!(matches!(err, LogCacheError::UnsupportedScheme { ref scheme, .. } if scheme == "gs"));
        assert!(router.for_path("/tmp/x.eval").is_ok());
        assert!(router.for_path("file:///tmp/x.eval").is_ok());
    }

    #[tokio::test]
    async fn test_local_info_and_recursive_ls() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_str().unwrap().to_string();
        fs::create_dir_all(temp_dir.path().join("nested")).await.unwrap();
        fs::write(temp_dir.path().join("a.eval"), b"a").await.unwrap();
        fs::write(temp_dir.path().join("nested/b.json"), b"bb").await.unwrap();

        let local = LocalFileSystem;
        let info = local.info(&root).await.unwrap();
        assert!(info.is_dir());

        let flat = local.ls(&root, false).await.unwrap();
        assert_eq!(flat.len(), 2);

        let all = local.ls(&root, true).await.unwrap();
        let files: Vec<_> = all.iter().filter(|f| f.is_file()).collect();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.etag.is_none()));
        assert!(files.iter().any(|f| f.name == format!("{}/nested/b.json", root) && f.size == 2));
    }

    #[test]
    fn test_local_dir_root() {
        assert_eq!(LocalFileSystem::dir_root("/tmp/logs/"), "/tmp/logs");
        assert_eq!(LocalFileSystem::dir_root("/"), "/");
        assert_eq!(LocalFileSystem::dir_root("file:///"), "file:///");
        assert_eq!(LocalFileSystem::dir_root("file:///tmp/x//"), "file:///tmp/x");
        assert_eq!(LocalFileSystem::dir_root("logs"), "logs");
        assert_eq!(LocalFileSystem::child_name("/", "tmp"), "/tmp");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_ls_filesystem_root() {
        let entries = LocalFileSystem.ls("/", false).await.unwrap();
        assert!(!entries.is_empty());
        assert!(entries
            .iter()
            .all(|e| e.name.starts_with('/') && !e.name.starts_with("//")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_ls_follows_directory_symlinks_without_looping() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_str().unwrap().to_string();
        fs::create_dir_all(temp_dir.path().join("real")).await.unwrap();
        fs::write(temp_dir.path().join("real/a.eval"), b"a").await.unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("real"), temp_dir.path().join("link"))
            .unwrap();
        std::os::unix::fs::symlink(temp_dir.path(), temp_dir.path().join("real/up")).unwrap();

        let all = LocalFileSystem.ls(&root, true).await.unwrap();
        let link = all
            .iter()
            .find(|f| f.name == format!("{}/link", root))
            .unwrap();
        assert!(link.is_dir());
        assert_eq!(all.iter().filter(|f| f.is_file()).count(), 1);
    }

    #[tokio::test]
    async fn test_local_info_missing() {
        let err = LocalFileSystem.info("/definitely/not/here.eval").await.unwrap_err();
        assert!(matches!(err, LogCacheError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_memory_fs_directories_are_implied() {
        let mem = MemoryFileSystem::new();
        mem.put_object("s3://b/logs/a.eval", 10, None).await;
        mem.put_object("s3://b/logs/sub/c.eval", 30, None).await;
        mem.put_object("s3://b/other/d.eval", 40, None).await;

        assert!(mem.info("s3://b/logs").await.unwrap().is_dir());
        assert!(mem.info("s3://b/logs/a.eval").await.unwrap().is_file());

        let flat = mem.ls("s3://b/logs", false).await.unwrap();
        let names: Vec<_> = flat.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["s3://b/logs/a.eval", "s3://b/logs/sub"]);

        let deep = mem.ls("s3://b/logs/", true).await.unwrap();
        assert_eq!(deep.iter().filter(|f| f.is_file()).count(), 2);
    }

    #[tokio::test]
    async fn test_memory_fs_etag_changes_on_overwrite() {
        let mem = MemoryFileSystem::new();
        let first = mem.put_object("s3://b/a.eval", 10, None).await;
        let second = mem.put_object("s3://b/a.eval", 10, None).await;
        assert_ne!(first.etag, second.etag);

        let pinned = mem.put_object("s3://b/a.eval", 10, Some("\"fixed\"")).await;
        assert_eq!(pinned.etag.as_deref(), Some("\"fixed\""));
    }
}
