//! Content source trait describing the retrieval adapter.

use async_trait::async_trait;

use crate::cms::error::CmsError;
use crate::domain::entities::{Category, Listing, Post};

/// Read-only access to CMS content, one method per retrieval intent.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn latest_posts(&self, limit: u32) -> Result<Listing<Post>, CmsError>;

    /// Exactly one post, or [`CmsError::NotFound`] when the slug matches nothing.
    async fn post_by_slug(&self, slug: &str) -> Result<Post, CmsError>;

    async fn posts_by_category(
        &self,
        category_slug: &str,
        limit: u32,
    ) -> Result<Listing<Post>, CmsError>;

    async fn posts_by_author(&self, author_id: u64, limit: u32)
    -> Result<Listing<Post>, CmsError>;

    async fn posts_by_tag(&self, tag_slug: &str, limit: u32) -> Result<Listing<Post>, CmsError>;

    async fn categories(&self) -> Result<Listing<Category>, CmsError>;
}
