//! Recognition of eval log files within directory listings.

use std::cmp::Ordering;

use crate::types::{FileInfo, LogInfo};

/// Log formats recognized by default.
pub const DEFAULT_LOG_FORMATS: &[&str] = &["eval", "json"];

/// Listing file written next to logs; never a log itself.
const LISTING_FILE: &str = "logs.json";

/// Selects the log files out of raw listings.
pub trait LogRecognizer: Send + Sync {
    /// Return the recognized logs. With `sort = false` the input order is kept.
    fn recognize(&self, files: &[FileInfo], sort: bool) -> Vec<LogInfo>;
}

/// Recognizes `.eval` / `.json` eval logs.
#[derive(Debug, Clone)]
pub struct EvalLogRecognizer {
    extensions: Vec<String>,
}

impl Default for EvalLogRecognizer {
    fn default() -> Self {
        Self::with_formats(DEFAULT_LOG_FORMATS.iter().copied())
    }
}

impl EvalLogRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict recognition to the given formats (extensions without dot).
    pub fn with_formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: formats
                .into_iter()
                .map(|f| format!(".{}", f.as_ref().trim_start_matches('.')))
                .collect(),
        }
    }

    /// Whether `name` looks like a log file.
    pub fn is_log_file(&self, name: &str) -> bool {
        let base = base_name(name);
        base != LISTING_FILE && self.extensions.iter().any(|ext| base.ends_with(ext.as_str()))
    }
}

impl LogRecognizer for EvalLogRecognizer {
    fn recognize(&self, files: &[FileInfo], sort: bool) -> Vec<LogInfo> {
        let mut logs: Vec<LogInfo> = files
            .iter()
            .filter(|f| f.is_file() && self.is_log_file(&f.name))
            .map(log_info)
            .collect();

        if sort {
            logs.sort_by(newest_first);
        }
        logs
    }
}

/// Descriptor for a recognized log, with task fields parsed from the stem.
pub fn log_info(file: &FileInfo) -> LogInfo {
    let base = base_name(&file.name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    let parts: Vec<&str> = stem.split('_').collect();

    let (task, task_id) = match parts.len() {
        0 | 1 => (String::new(), String::new()),
        2 => (parts[1].to_string(), String::new()),
        n => (parts[1..n - 1].join("_"), parts[n - 1].to_string()),
    };

    LogInfo {
        name: file.name.clone(),
        size: file.size,
        mtime: file.mtime,
        task,
        task_id,
    }
}

fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

fn newest_first(a: &LogInfo, b: &LogInfo) -> Ordering {
    match (a.mtime, b.mtime) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.name.cmp(&b.name))
}
