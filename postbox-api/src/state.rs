//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use postbox_storage::{CredentialStore, PostStore};

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::middleware::AuthMiddlewareState;
use crate::services::{PostListCache, PostService};

/// Application-wide state shared across all routes.
///
/// One credential store, one post registry and one listing cache per
/// process. Every handler sees the same instances.
#[derive(Clone)]
pub struct AppState {
    pub auth_config: Arc<AuthConfig>,
    pub credentials: Arc<dyn CredentialStore>,
    pub post_service: PostService,
    pub start_time: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth_config", &self.auth_config)
            .field("post_service", &self.post_service)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state around an existing credential store.
    ///
    /// The listing cache reads time from the auth config's clock so token
    /// expiry and cache expiry always agree.
    pub fn new(
        auth_config: AuthConfig,
        api_config: &ApiConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let cache = Arc::new(PostListCache::new(
            api_config.cache_config(),
            Arc::clone(&auth_config.clock),
        ));
        let post_service = PostService::new(Arc::new(PostStore::new()), cache);

        Self {
            auth_config: Arc::new(auth_config),
            credentials,
            post_service,
            start_time: Instant::now(),
        }
    }

    /// State for the auth middleware layered on protected routes.
    pub fn auth_middleware_state(&self) -> AuthMiddlewareState {
        AuthMiddlewareState::new(Arc::clone(&self.auth_config), Arc::clone(&self.credentials))
    }

    pub fn posts_cache(&self) -> Arc<PostListCache> {
        Arc::clone(self.post_service.cache())
    }
}

crate::impl_from_ref!(Arc<AuthConfig>, auth_config);
crate::impl_from_ref!(Arc<dyn CredentialStore>, credentials);
crate::impl_from_ref!(PostService, post_service);
crate::impl_from_ref!(Instant, start_time);
