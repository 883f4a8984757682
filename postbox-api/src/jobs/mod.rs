//! Background Jobs for the Postbox API
//!
//! - `cache_sweep`: drops expired entries from the post listing cache
//!
//! # Usage
//!
//! ```ignore
//! use postbox_api::jobs::{cache_sweep_task, CacheSweepConfig};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! tokio::spawn(cache_sweep_task(Arc::clone(&cache), CacheSweepConfig::from_env(), shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod cache_sweep;

pub use cache_sweep::{cache_sweep_task, CacheSweepConfig, CacheSweepMetrics, CacheSweepSnapshot};
