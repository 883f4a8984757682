//! Middleware modules for the Postbox API
//!
//! - `auth`: bearer token authentication and the `AuthExtractor`
//!
//! Request logging lives in [`crate::telemetry`].
//!
//! # Middleware Order
//!
//! ```ignore
//! Router::new()
//!     .merge(public_routes)
//!     .merge(protected_routes.layer(middleware::from_fn_with_state(auth_state, auth_middleware)))
//!     .layer(middleware::from_fn(observability_middleware))
//!     // Outermost
//!     .layer(cors)
//! ```

mod auth;

pub use auth::{
    auth_middleware, resolve_caller, AuthExtractor, AuthMiddlewareError, AuthMiddlewareState,
};
