//! Persisted entry format and its codec.

use serde::{Deserialize, Serialize};

use crate::table::{Record, Table, TableError};

/// Stored value: `{"etag": <string|null>, "records": [<row object>, ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Etag the records were computed from.
    pub etag: Option<String>,

    /// Row records, one object per row.
    pub records: Vec<Record>,
}

/// Reasons a stored value could not be used or produced.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CacheError {
    #[error("malformed cache entry: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl CacheEntry {
    pub(crate) fn from_table(etag: Option<&str>, table: &Table) -> Result<Self, CacheError> {
        Ok(Self {
            etag: etag.map(String::from),
            records: table.to_records()?,
        })
    }

    pub(crate) fn decode(blob: &str) -> Result<Self, CacheError> {
        Ok(serde_json::from_str(blob)?)
    }

    pub(crate) fn encode(&self) -> Result<String, CacheError> {
        Ok(serde_json::to_string(self)?)
    }
}
