//! Post REST API Routes
//!
//! Bearer-protected endpoints. The caller is always the token subject
//! injected by the auth middleware.

use axum::{
    extract::{Query, State},
    http::HeaderName,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use postbox_core::PostSummary;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    services::PostService,
    state::AppState,
    types::{AddPostRequest, DeletePostQuery, MessageResponse, PostCreatedResponse},
};

/// Response header reporting whether a listing came from the cache.
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /addPost - Create a post owned by the caller
#[utoipa::path(
    post,
    path = "/addPost",
    tag = "Posts",
    request_body = AddPostRequest,
    responses(
        (status = 200, description = "Post created", body = PostCreatedResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_post(
    State(service): State<PostService>,
    AuthExtractor(auth): AuthExtractor,
    Json(req): Json<AddPostRequest>,
) -> ApiResult<impl IntoResponse> {
    let post_id = service.create(&auth.identity, req.text)?;
    Ok(Json(PostCreatedResponse { post_id }))
}

/// GET /getPosts - List the caller's posts
///
/// Served from a per-identity cache for up to the cache TTL, so posts added
/// or deleted since the last uncached read may not be reflected yet.
#[utoipa::path(
    get,
    path = "/getPosts",
    tag = "Posts",
    responses(
        (status = 200, description = "The caller's posts in ascending id order", body = [PostSummary]),
        (status = 401, description = "Missing, invalid or expired token", body = ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_posts(
    State(service): State<PostService>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<impl IntoResponse> {
    let read = service.list_cached(&auth.identity)?;
    let cache_status = if read.was_cache_hit() { "HIT" } else { "MISS" };
    Ok(([(CACHE_STATUS_HEADER, cache_status)], Json(read.into_value())))
}

/// DELETE /deletePost - Delete one of the caller's posts
#[utoipa::path(
    delete,
    path = "/deletePost",
    tag = "Posts",
    params(DeletePostQuery),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 400, description = "post_id missing or not an integer"),
        (status = 401, description = "Missing, invalid or expired token", body = ApiError),
        (status = 403, description = "Post belongs to another identity", body = ApiError),
        (status = 404, description = "Post not found", body = ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_post(
    State(service): State<PostService>,
    AuthExtractor(auth): AuthExtractor,
    Query(query): Query<DeletePostQuery>,
) -> ApiResult<impl IntoResponse> {
    let post_id = query.post_id().ok_or_else(ApiError::post_not_found)?;
    service.delete(&auth.identity, post_id)?;
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// Create the post router. The caller must layer `auth_middleware` on it.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/addPost", post(add_post))
        .route("/getPosts", get(get_posts))
        .route("/deletePost", delete(delete_post))
}
