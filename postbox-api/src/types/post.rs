//! Post-related API types

use postbox_core::PostId;
use serde::{Deserialize, Serialize};

/// Request to create a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AddPostRequest {
    pub text: String,
}

/// Id of a newly created post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PostCreatedResponse {
    #[serde(rename = "postID")]
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub post_id: PostId,
}

/// Query string of `DELETE /deletePost`.
///
/// Signed so that zero and negative ids reach the handler and come back as
/// "post not found" rather than a query rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct DeletePostQuery {
    /// Id of the post to delete
    pub post_id: i64,
}

impl DeletePostQuery {
    /// The requested id, or `None` when it cannot name a post.
    pub fn post_id(&self) -> Option<PostId> {
        u64::try_from(self.post_id)
            .ok()
            .filter(|id| *id >= PostId::FIRST.get())
            .map(PostId::new)
    }
}
