//! Postbox API Server Entry Point
//!
//! Bootstraps configuration, opens the credential store, starts the cache
//! sweep task and serves the Axum router until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use postbox_api::constants::{DEFAULT_BIND_HOST, DEFAULT_PORT};
use postbox_api::jobs::{cache_sweep_task, CacheSweepConfig};
use postbox_api::telemetry::{init_tracing, TelemetryConfig};
use postbox_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig};
use postbox_storage::{CredentialStore, InMemoryCredentialStore, LmdbCredentialStore};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env();

    let credentials = open_credential_store(&api_config)?;
    let state = AppState::new(auth_config, &api_config, credentials);
    let cache = state.posts_cache();

    let app: Router = create_api_router(state, &api_config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = tokio::spawn(cache_sweep_task(cache, CacheSweepConfig::from_env(), shutdown_rx));

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting Postbox API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Cache sweep task did not stop cleanly");
    }

    Ok(())
}

fn open_credential_store(config: &ApiConfig) -> ApiResult<Arc<dyn CredentialStore>> {
    match &config.data_dir {
        Some(dir) => {
            let store = LmdbCredentialStore::open(dir, config.lmdb_map_size_mb).map_err(|e| {
                ApiError::internal_error(format!(
                    "Failed to open credential store at {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            tracing::info!(path = %dir.display(), "Using LMDB credential store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("Using in-memory credential store");
            Ok(Arc::new(InMemoryCredentialStore::new()))
        }
    }
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host =
        std::env::var("POSTBOX_API_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("POSTBOX_API_PORT").ok())
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
