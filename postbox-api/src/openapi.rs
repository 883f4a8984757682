//! OpenAPI Specification for the Postbox API
//!
//! Generated by utoipa from the route annotations and the request/response
//! types. Served at `/openapi.json` and `/openapi.yaml`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{
    ComponentHealth, HealthDetails, HealthResponse, HealthStatus, ListingCacheHealth,
};
use crate::types::*;

use crate::routes::{auth, health, post};

use postbox_core::PostSummary;

/// OpenAPI document for the Postbox API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Postbox API",
        version = "0.1.0",
        description = "Register, log in, and manage your own short text posts with bearer tokens",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Auth", description = "Signup and token issuance"),
        (name = "Posts", description = "Owner-scoped posts"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        // === Auth Routes ===
        auth::signup,
        auth::login,

        // === Post Routes ===
        post::add_post,
        post::get_posts,
        post::delete_post,

        // === Health Routes ===
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Auth Types ===
            SignupRequest, LoginForm, TokenResponse, MessageResponse,

            // === Post Types ===
            AddPostRequest, PostCreatedResponse, PostSummary,

            // === Health Types ===
            HealthResponse, HealthStatus, HealthDetails, ComponentHealth, ListingCacheHealth,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier for OpenAPI document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /login"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }

    /// Generate OpenAPI spec as YAML string.
    pub fn to_yaml() -> Result<String, String> {
        let openapi = Self::openapi();
        serde_yaml::to_string(&openapi).map_err(|e| e.to_string())
    }
}
