//! Postbox Telemetry - Logging Infrastructure
//!
//! Structured `tracing` output for the API layer plus a per-request
//! observability middleware.

pub mod middleware;
pub mod tracer;

pub use middleware::{observability_middleware, REQUEST_ID_HEADER};
pub use tracer::{init_tracing, TelemetryConfig};
