//! Error types for log resolution and the cache stores.

/// Errors surfaced by log resolution and store construction.
///
/// Cache reads and writes never return these; see [`crate::cache`].
#[derive(Debug, thiserror::Error)]
pub enum LogCacheError {
    /// Path does not exist on its backend.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Filesystem I/O failed for a path.
    #[error("i/o error at {path}: {message}")]
    Io { path: String, message: String },

    /// No backend registered for the path's URL scheme.
    #[error("unsupported scheme '{scheme}' in {path}")]
    UnsupportedScheme { scheme: String, path: String },

    /// Backend-specific failure (unreachable service, bad response).
    #[error("backend error: {message}")]
    Backend { message: String },

    /// Key-value store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl LogCacheError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::UnsupportedScheme { .. } | Self::Config { .. } => 2,
            Self::Io { .. } | Self::Backend { .. } | Self::Store(_) => 3,
        }
    }

    pub(crate) fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io {
                path,
                message: err.to_string(),
            }
        }
    }
}

/// Key-value store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite failure.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,

    /// Any other store failure.
    #[error("store error: {message}")]
    Other { message: String },
}

/// Result type for resolution operations.
pub type LogCacheResult<T> = Result<T, LogCacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err = LogCacheError::io(
            "/missing.eval",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, LogCacheError::NotFound { ref path } if path == "/missing.eval"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_other_keeps_message() {
        let err = LogCacheError::io(
            "/logs",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "i/o error at /logs: denied");
        assert_eq!(err.exit_code(), 3);
    }
}
