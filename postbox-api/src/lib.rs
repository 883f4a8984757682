//! Postbox API - REST Layer
//!
//! Signup, login and owner-scoped posts over HTTP (Axum). Callers prove who
//! they are with a signed bearer token; every post operation acts on the
//! token's subject only. Post listings are served from a per-identity cache
//! with a fixed time-to-live.

#[macro_use]
mod macros;

pub mod auth;
pub mod authenticator;
pub mod config;
pub mod constants;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use auth::{
    extract_bearer, generate_token, generate_token_with_ttl, validate_token, AuthConfig,
    AuthContext, Claims, TokenSecret,
};
pub use authenticator::authenticate;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{auth_middleware, AuthExtractor, AuthMiddlewareState};
pub use openapi::ApiDoc;
pub use routes::{create_api_router, RouterBuilder};
pub use services::{PostListCache, PostService};
pub use state::AppState;
pub use types::*;
