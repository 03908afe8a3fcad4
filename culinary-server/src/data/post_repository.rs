use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDetail};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) limit: u32,
}

impl Pagination {
    const DEFAULT_LIMIT: u32 = 10;
    const MAX_LIMIT: u32 = 100;

    /// Page below 1 becomes 1; a limit outside 1..=100 becomes the default 10.
    pub(crate) fn clamped(page: i64, limit: i64) -> Self {
        let page = if page < 1 {
            1
        } else {
            u32::try_from(page).unwrap_or(u32::MAX)
        };
        let limit = match u32::try_from(limit) {
            Ok(limit) if (1..=Self::MAX_LIMIT).contains(&limit) => limit,
            _ => Self::DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError>;
    async fn update_post(&self, post_id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<PostDetail>, DomainError>;
    async fn total_posts(&self) -> Result<i64, DomainError>;
}
