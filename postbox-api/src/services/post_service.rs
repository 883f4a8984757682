//! Post Service
//!
//! Ownership rules for posts. Every operation takes the identity proven by
//! the caller's token; nothing here trusts an identity from the request body.

use std::sync::Arc;

use postbox_core::{Identity, PostId, PostSummary};
use postbox_storage::{CacheRead, IdentityCache, PostStore, Removal};

use crate::error::{ApiError, ApiResult};

/// Cache of per-identity post listings.
pub type PostListCache = IdentityCache<Vec<PostSummary>>;

/// Message returned when a caller tries to delete someone else's post.
pub const DELETE_FORBIDDEN_MESSAGE: &str = "You are not authorized to delete this post";

/// Create, list and delete posts on behalf of a verified caller.
#[derive(Debug, Clone)]
pub struct PostService {
    posts: Arc<PostStore>,
    cache: Arc<PostListCache>,
}

impl PostService {
    pub fn new(posts: Arc<PostStore>, cache: Arc<PostListCache>) -> Self {
        Self { posts, cache }
    }

    pub fn posts(&self) -> &Arc<PostStore> {
        &self.posts
    }

    pub fn cache(&self) -> &Arc<PostListCache> {
        &self.cache
    }

    /// Store a post authored by `caller` and return its id.
    ///
    /// The listing cache is left alone; the caller's next cached listing may
    /// not include this post until the entry expires.
    pub fn create(&self, caller: &Identity, text: impl Into<String>) -> ApiResult<PostId> {
        let post = self.posts.insert(caller.clone(), text)?;
        tracing::info!(identity = %caller, post_id = %post.id, "Post created");
        Ok(post.id)
    }

    /// The caller's posts in ascending id order, read straight from storage.
    pub fn list(&self, caller: &Identity) -> ApiResult<Vec<PostSummary>> {
        Ok(self.posts.list_by_author(caller)?)
    }

    /// The caller's posts, served from the listing cache when a live entry exists.
    pub fn list_cached(&self, caller: &Identity) -> ApiResult<CacheRead<Vec<PostSummary>>> {
        let read = self
            .cache
            .get_or_compute(caller, || self.posts.list_by_author(caller))
            .map_err(ApiError::from)?;

        tracing::debug!(
            identity = %caller,
            cache_hit = read.was_cache_hit(),
            count = read.value().len(),
            "Listed posts"
        );
        Ok(read)
    }

    /// Delete post `id` if `caller` wrote it.
    ///
    /// - `PostNotFound` when no such post exists.
    /// - `Forbidden` when another identity wrote it; the post is kept.
    pub fn delete(&self, caller: &Identity, id: PostId) -> ApiResult<()> {
        match self.posts.remove_where(id, |post| post.is_authored_by(caller))? {
            Removal::Removed(_) => {
                tracing::info!(identity = %caller, post_id = %id, "Post deleted");
                Ok(())
            }
            Removal::Missing => Err(ApiError::post_not_found()),
            Removal::Refused => {
                tracing::warn!(identity = %caller, post_id = %id, "Refused delete of another identity's post");
                Err(ApiError::forbidden(DELETE_FORBIDDEN_MESSAGE))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
