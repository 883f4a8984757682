//! API Configuration Module
//!
//! CORS, listing cache and storage settings. Configuration is loaded from
//! environment variables with sensible defaults for development.

use crate::constants::{
    DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_LMDB_MAP_SIZE_MB, DEFAULT_POSTS_CACHE_CAPACITY,
    DEFAULT_POSTS_CACHE_TTL_SECS,
};
use postbox_storage::CacheConfig;
use std::path::PathBuf;
use std::time::Duration;

/// True when `POSTBOX_ENVIRONMENT` is `production` or `prod`.
pub fn is_production_environment() -> bool {
    std::env::var("POSTBOX_ENVIRONMENT")
        .map(|e| matches!(e.to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, the listing cache and storage.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Listing Cache Configuration
    // ========================================================================
    /// How long a cached post listing is served.
    pub posts_cache_ttl: Duration,

    /// Maximum number of identities with a cached listing.
    pub posts_cache_capacity: usize,

    // ========================================================================
    // Storage Configuration
    // ========================================================================
    /// Directory for the LMDB credential store. `None` keeps credentials in memory.
    pub data_dir: Option<PathBuf>,

    /// LMDB map size in megabytes.
    pub lmdb_map_size_mb: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,

            posts_cache_ttl: Duration::from_secs(DEFAULT_POSTS_CACHE_TTL_SECS),
            posts_cache_capacity: DEFAULT_POSTS_CACHE_CAPACITY,

            data_dir: None,
            lmdb_map_size_mb: DEFAULT_LMDB_MAP_SIZE_MB,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `POSTBOX_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `POSTBOX_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `POSTBOX_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `POSTBOX_POSTS_CACHE_TTL_SECS`: Listing cache lifetime (default: 300)
    /// - `POSTBOX_POSTS_CACHE_CAPACITY`: Listing cache size (default: 100)
    /// - `POSTBOX_DATA_DIR`: LMDB directory for credentials (default: in memory)
    /// - `POSTBOX_LMDB_MAP_SIZE_MB`: LMDB map size (default: 64)
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("POSTBOX_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("POSTBOX_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("POSTBOX_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CORS_MAX_AGE_SECS);

        let posts_cache_ttl = Duration::from_secs(
            std::env::var("POSTBOX_POSTS_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_POSTS_CACHE_TTL_SECS),
        );

        let posts_cache_capacity = std::env::var("POSTBOX_POSTS_CACHE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_POSTS_CACHE_CAPACITY);

        let data_dir = std::env::var("POSTBOX_DATA_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let lmdb_map_size_mb = std::env::var("POSTBOX_LMDB_MAP_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|mb: &usize| *mb > 0)
            .unwrap_or(DEFAULT_LMDB_MAP_SIZE_MB);

        Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            posts_cache_ttl,
            posts_cache_capacity,
            data_dir,
            lmdb_map_size_mb,
        }
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }
        self.cors_origins.iter().any(|allowed| allowed == origin)
    }

    /// Settings for the post listing cache.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_ttl(self.posts_cache_ttl)
            .with_max_entries(self.posts_cache_capacity)
    }
}
