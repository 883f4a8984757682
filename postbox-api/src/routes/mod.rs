//! REST API Routes Module
//!
//! Includes:
//! - Signup and login (public)
//! - Owner-scoped post routes (bearer token required)
//! - Health check endpoints (Kubernetes-compatible)
//! - OpenAPI document and Swagger UI
//! - CORS support for browser-based clients

pub mod auth;
pub mod health;
pub mod post;

use std::time::Duration;

use axum::{
    http::{header, header::HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::{is_production_environment, ApiConfig};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_middleware;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{observability_middleware, REQUEST_ID_HEADER};

// Re-export route creation functions for convenience
pub use auth::create_router as auth_router;
pub use health::create_router as health_router;
pub use post::create_router as post_router;

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Handler for /openapi.yaml endpoint.
#[cfg(feature = "openapi")]
async fn openapi_yaml() -> impl IntoResponse {
    use axum::http::StatusCode;

    match ApiDoc::to_yaml() {
        Ok(yaml) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/yaml")], yaml),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            format!("Failed to generate YAML: {}", e),
        ),
    }
}

// ============================================================================
// PRODUCTION VALIDATION
// ============================================================================

/// Validate API configuration for production use.
fn validate_api_config_for_production(config: &ApiConfig) -> ApiResult<()> {
    if config.cors_origins.is_empty() {
        return Err(ApiError::invalid_input(
            "CORS origins not configured for production. Set POSTBOX_CORS_ORIGINS.",
        ));
    }
    if config.data_dir.is_none() {
        tracing::warn!(
            "Credentials are kept in memory and will be lost on restart.\n\
             Set POSTBOX_DATA_DIR to persist them."
        );
    }
    Ok(())
}

// ============================================================================
// ROUTER BUILDER
// ============================================================================

/// Builder for the API router.
///
/// Post routes always sit behind the auth middleware. Signup, login, health
/// and the OpenAPI document are public.
pub struct RouterBuilder {
    state: AppState,
    api_config: ApiConfig,
    production: bool,
}

impl RouterBuilder {
    /// Create a new RouterBuilder.
    ///
    /// Production mode is read from `POSTBOX_ENVIRONMENT`.
    pub fn new(state: AppState, api_config: ApiConfig) -> Self {
        Self {
            state,
            api_config,
            production: is_production_environment(),
        }
    }

    /// Override production mode instead of reading the environment.
    pub fn with_production_checks(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Public and protected application routes, state not yet applied.
    fn build_app_routes(&self) -> Router<AppState> {
        let protected = post::create_router().layer(from_fn_with_state(
            self.state.auth_middleware_state(),
            auth_middleware,
        ));

        Router::new()
            .merge(auth::create_router())
            .merge(protected)
            .nest("/health", health::create_router())
    }

    /// Build the complete router.
    ///
    /// In production this fails when the token secret is weak or CORS origins
    /// are missing.
    ///
    /// # Middleware Order (outer to inner)
    /// 1. CORS (outermost) - handles preflight requests
    /// 2. HTTP trace - tower-http request/response events
    /// 3. Observability - request id and access log
    /// 4. Auth (innermost, only on post routes)
    pub fn build(self) -> ApiResult<Router> {
        if self.production {
            self.state.auth_config.validate_secret(true)?;
            validate_api_config_for_production(&self.api_config)?;
        }

        let mut router = self
            .build_app_routes()
            .with_state(self.state.clone())
            .route("/openapi.json", get(openapi_json));

        #[cfg(feature = "openapi")]
        {
            router = router.route("/openapi.yaml", get(openapi_yaml));
        }

        #[cfg(feature = "swagger-ui")]
        {
            use utoipa_swagger_ui::SwaggerUi;
            router = router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()));
        }

        let cors = build_cors_layer(&self.api_config);

        Ok(router
            .layer(from_fn(observability_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors))
    }
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([
            REQUEST_ID_HEADER,
            post::CACHE_STATUS_HEADER,
            HeaderName::from_static("www-authenticate"),
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

/// Create the complete API router.
///
/// - `POST /signup`, `POST /login` (public)
/// - `POST /addPost`, `GET /getPosts`, `DELETE /deletePost` (bearer token)
/// - `/health/*` (public)
/// - `/openapi.json`, `/openapi.yaml`, `/swagger-ui` (public)
pub fn create_api_router(state: AppState, api_config: &ApiConfig) -> ApiResult<Router> {
    RouterBuilder::new(state, api_config.clone()).build()
}
