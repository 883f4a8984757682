//! In-process post registry.
//!
//! Posts live only for the lifetime of the process. Ids come from a single
//! counter that is advanced under the same write lock that inserts the post,
//! so no two posts ever share an id and a deleted id is never handed out again.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use postbox_core::{Identity, Post, PostId, PostSummary, StorageError};

use crate::StorageResult;

/// Outcome of a conditional removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The post existed, passed the check and is gone.
    Removed(Post),
    /// No post with that id.
    Missing,
    /// The post exists but the check refused the removal. It is left untouched.
    Refused,
}

#[derive(Debug, Default)]
struct Registry {
    last_id: u64,
    posts: BTreeMap<PostId, Post>,
}

/// Shared registry of posts keyed by [`PostId`].
#[derive(Debug, Default)]
pub struct PostStore {
    inner: RwLock<Registry>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Registry>> {
        self.inner.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Registry>> {
        self.inner.write().map_err(|_| StorageError::LockPoisoned)
    }

    /// Store a new post and return it with its freshly assigned id.
    pub fn insert(&self, author: Identity, text: impl Into<String>) -> StorageResult<Post> {
        let mut registry = self.write()?;
        registry.last_id += 1;
        let post = Post {
            id: PostId::new(registry.last_id),
            text: text.into(),
            author,
        };
        registry.posts.insert(post.id, post.clone());
        Ok(post)
    }

    pub fn get(&self, id: PostId) -> StorageResult<Option<Post>> {
        Ok(self.read()?.posts.get(&id).cloned())
    }

    /// All posts by `author`, in ascending id order.
    pub fn list_by_author(&self, author: &Identity) -> StorageResult<Vec<PostSummary>> {
        let registry = self.read()?;
        Ok(registry
            .posts
            .values()
            .filter(|post| post.is_authored_by(author))
            .map(Post::summary)
            .collect())
    }

    /// Remove the post with `id` if `allow` accepts it.
    ///
    /// The lookup, the check and the removal happen under one write lock.
    pub fn remove_where<F>(&self, id: PostId, allow: F) -> StorageResult<Removal>
    where
        F: FnOnce(&Post) -> bool,
    {
        let mut registry = self.write()?;
        let Some(post) = registry.posts.get(&id) else {
            return Ok(Removal::Missing);
        };
        if !allow(post) {
            return Ok(Removal::Refused);
        }
        match registry.posts.remove(&id) {
            Some(post) => Ok(Removal::Removed(post)),
            None => Ok(Removal::Missing),
        }
    }

    /// Number of stored posts across all authors.
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.read()?.posts.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
