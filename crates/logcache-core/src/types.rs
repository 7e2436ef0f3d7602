//! Descriptor types shared by the backends, the recognizer and the resolver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Directory,
}

/// Metadata about a storage entry, as reported by `info` / `ls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Canonical name (full path or URL) of the entry.
    pub name: String,

    /// File or directory.
    #[serde(rename = "type")]
    pub file_type: FileType,

    /// Size in bytes (0 for directories).
    #[serde(default)]
    pub size: u64,

    /// Last modification time, if the backend reports one.
    #[serde(default)]
    pub mtime: Option<DateTime<Utc>>,

    /// Entity tag. Only object-store backends populate this.
    #[serde(default)]
    pub etag: Option<String>,
}

impl FileInfo {
    /// A file entry with no size, mtime or etag.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_type: FileType::File,
            size: 0,
            mtime: None,
            etag: None,
        }
    }

    /// A directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_type: FileType::Directory,
            size: 0,
            mtime: None,
            etag: None,
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_mtime(mut self, mtime: DateTime<Utc>) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// A file recognized as an eval log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogInfo {
    /// Canonical name of the log file.
    pub name: String,

    /// Size in bytes.
    #[serde(default)]
    pub size: u64,

    /// Last modification time.
    #[serde(default)]
    pub mtime: Option<DateTime<Utc>>,

    /// Task name parsed from the file stem.
    #[serde(default)]
    pub task: String,

    /// Task id parsed from the file stem.
    #[serde(default)]
    pub task_id: String,
}

impl LogInfo {
    /// Descriptor carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            mtime: None,
            task: String::new(),
            task_id: String::new(),
        }
    }
}

/// A resolved log file paired with the etag seen at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedLog {
    pub path: String,
    pub etag: Option<String>,
}

impl ResolvedLog {
    pub fn new(path: impl Into<String>, etag: Option<String>) -> Self {
        Self {
            path: path.into(),
            etag,
        }
    }
}

impl std::fmt::Display for ResolvedLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.etag {
            Some(etag) => write!(f, "{} ({})", self.path, etag),
            None => write!(f, "{}", self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_info_serializes_type_lowercase() {
        let info = FileInfo::directory("s3://bucket/logs");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "directory");
        assert_eq!(json["etag"], serde_json::Value::Null);
    }

    #[test]
    fn test_resolved_log_display() {
        assert_eq!(
            ResolvedLog::new("s3://b/a.eval", Some("\"e1\"".to_string())).to_string(),
            "s3://b/a.eval (\"e1\")"
        );
        assert_eq!(ResolvedLog::new("/tmp/a.eval", None).to_string(), "/tmp/a.eval");
    }
}
