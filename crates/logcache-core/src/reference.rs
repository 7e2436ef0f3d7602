//! Log references accepted by the resolver.
//!
//! A reference is one of:
//! - `"s3://bucket/logs/2024-05-01_task_abc.eval"` → raw string, used as-is
//! - `PathBuf::from("logs/run1")` → filesystem path, converted to slash form
//! - `LogInfo { name, .. }` → already-recognized log, contributes its name

use std::path::{Path, PathBuf};

use crate::types::LogInfo;

/// A reference to a log file or a directory of log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRef {
    /// Raw path or URL string.
    Raw(String),

    /// Filesystem path.
    Path(PathBuf),

    /// Pre-resolved log descriptor.
    Info(LogInfo),
}

impl LogRef {
    /// Normalize to a plain path string.
    ///
    /// ```
    /// use logcache_core::LogRef;
    /// use std::path::PathBuf;
    ///
    /// assert_eq!(LogRef::from("s3://b/x.eval").normalize(), "s3://b/x.eval");
    /// assert_eq!(LogRef::from(PathBuf::from("logs/run1")).normalize(), "logs/run1");
    /// ```
    pub fn normalize(&self) -> String {
        match self {
            Self::Raw(s) => s.clone(),
            Self::Path(path) => to_slash(path),
            Self::Info(info) => info.name.clone(),
        }
    }
}

impl std::fmt::Display for LogRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalize())
    }
}

impl From<&str> for LogRef {
    fn from(s: &str) -> Self {
        Self::Raw(s.to_string())
    }
}

impl From<String> for LogRef {
    fn from(s: String) -> Self {
        Self::Raw(s)
    }
}

impl From<&String> for LogRef {
    fn from(s: &String) -> Self {
        Self::Raw(s.clone())
    }
}

impl From<PathBuf> for LogRef {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for LogRef {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<LogInfo> for LogRef {
    fn from(info: LogInfo) -> Self {
        Self::Info(info)
    }
}

impl From<&LogInfo> for LogRef {
    fn from(info: &LogInfo) -> Self {
        Self::Info(info.clone())
    }
}

/// Slash-separated form of a filesystem path, independent of platform.
fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '\\' {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}
