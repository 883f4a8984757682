//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "postbox_api=debug,tower_http=debug,info";

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (production, staging, development)
    pub environment: String,
    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: std::env::var("POSTBOX_SERVICE_NAME")
                .unwrap_or_else(|_| "postbox-api".to_string()),
            service_version: std::env::var("POSTBOX_SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            environment: std::env::var("POSTBOX_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            json_logs: std::env::var("POSTBOX_LOG_FORMAT")
                .map(|s| !s.eq_ignore_ascii_case("pretty"))
                .unwrap_or(true),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup. Fails if a subscriber is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = config.service_name,
        service_version = config.service_version,
        environment = config.environment,
        "Telemetry initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let config = TelemetryConfig {
            service_name: "postbox-api".to_string(),
            service_version: "test".to_string(),
            environment: "test".to_string(),
            json_logs: true,
        };
        // The first call may lose to another test that installed a subscriber.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
