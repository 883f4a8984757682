//! Service Layer
//!
//! Business rules that sit between the HTTP handlers and storage.
//! Handlers pass in the verified caller; services decide what that caller
//! may see or change.

mod post_service;

pub use post_service::*;
