//! Constants for the Postbox API
//!
//! Centralizing constants makes them easy to find, modify, and test.

// ============================================================================
// AUTHENTICATION
// ============================================================================

/// Default token lifetime in seconds (30 minutes)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 1800;

/// Default tolerance past `exp` before a token counts as expired
pub const DEFAULT_TOKEN_CLOCK_SKEW_SECS: i64 = 0;

/// Minimum required length for token signing secrets in production
pub const MIN_TOKEN_SECRET_LENGTH: usize = 32;

/// Signing secret used when none is configured. Rejected in production.
pub const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

/// Token type reported by the login endpoint
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Longest accepted email identity in bytes (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Longest accepted local part (before `@`) in bytes
pub const MAX_EMAIL_LOCAL_LENGTH: usize = 64;

// ============================================================================
// POSTS CACHE
// ============================================================================

/// Default lifetime of a cached post listing in seconds (5 minutes)
pub const DEFAULT_POSTS_CACHE_TTL_SECS: u64 = 300;

/// Default maximum number of identities with a cached listing
pub const DEFAULT_POSTS_CACHE_CAPACITY: usize = 100;

/// Default interval between expired-entry sweeps in seconds
pub const DEFAULT_CACHE_SWEEP_INTERVAL_SECS: u64 = 60;

// ============================================================================
// STORAGE
// ============================================================================

/// Default LMDB map size in megabytes
pub const DEFAULT_LMDB_MAP_SIZE_MB: usize = 64;

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 3000;

/// Development server URL
pub const DEV_SERVER_URL: &str = "http://localhost:3000";
