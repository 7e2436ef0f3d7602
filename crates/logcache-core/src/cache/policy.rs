//! Etag comparison policy.

use serde::{Deserialize, Serialize};

/// How to treat an entry when both the stored and the current etag are absent.
///
/// Backends without etags (local disk) give no change signal, so a match on
/// path alone may serve stale data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsentEtagPolicy {
    /// Absent equals absent: entries for unversioned paths never invalidate.
    #[default]
    Match,

    /// Absent never matches: unversioned paths always miss.
    Miss,
}

impl AbsentEtagPolicy {
    /// Whether a stored etag is valid for the current one.
    pub fn matches(self, stored: Option<&str>, current: Option<&str>) -> bool {
        match (stored, current) {
            (Some(s), Some(c)) => s == c,
            (None, None) => self == Self::Match,
            _ => false,
        }
    }
}

impl std::str::FromStr for AbsentEtagPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "match" => Ok(Self::Match),
            "miss" | "strict" => Ok(Self::Miss),
            other => Err(format!(
                "unknown absent-etag policy '{}' (expected 'match' or 'miss')",
                other
            )),
        }
    }
}

impl std::fmt::Display for AbsentEtagPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Miss => write!(f, "miss"),
        }
    }
}
