//! Exit codes for the logcache CLI.

pub const SUCCESS: i32 = 0;
pub const CACHE_MISS: i32 = 1; // No usable entry, or the write was dropped
pub const INVALID_INPUT: i32 = 2; // Missing path, unknown scheme, bad config or records
pub const BACKEND_FAILURE: i32 = 3; // Filesystem or store failure
