use tracing::{error, info, warn};

use crate::data::media_store::{MediaStore, generate_file_name};
use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{
    CreatePostRequest, Post, PostDetail, UpdatePostRequest, ValidatedImage, normalize_content,
    normalize_title,
};
use crate::domain::user::Principal;

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<PostDetail>,
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total: i64,
}

/// Post CRUD plus the lifecycle of each post's image file.
///
/// Row and file changes are not atomic. New files are written before the row
/// references them and old files are removed best-effort only after the row
/// change succeeded, so a failure can leave an orphaned file but never a
/// reference to a missing one.
pub(crate) struct BlogService<R: PostRepository, M: MediaStore> {
    repo: R,
    media: M,
}

impl<R: PostRepository, M: MediaStore> BlogService<R, M> {
    pub(crate) fn new(repo: R, media: M) -> Self {
        Self { repo, media }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let title = normalize_title(&req.title)?;
        let content = normalize_content(&req.content)?;

        let image = match req.image {
            Some(upload) => Some(self.store_image(upload.validate()?).await?),
            None => None,
        };

        self.repo
            .create_post(NewPost {
                author_id,
                title,
                content,
                image,
            })
            .await
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<PostDetail, DomainError> {
        self.repo
            .get_post_detail(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn list_posts(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<ListPostsResult, DomainError> {
        let pagination = Pagination::clamped(page, limit);
        let posts = self.repo.list_posts(pagination).await?;
        let total = self.repo.total_posts().await?;

        Ok(ListPostsResult {
            posts,
            page: pagination.page,
            limit: pagination.limit,
            total,
        })
    }

    pub(crate) async fn delete_post(
        &self,
        actor: Principal,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let post = self.find_modifiable(actor, post_id).await?;

        if !self.repo.delete_post(post_id).await? {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }

        if let Some(image) = &post.image {
            self.discard_image(image).await;
        }
        Ok(())
    }

    pub(crate) async fn update_post(
        &self,
        actor: Principal,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let post = self.find_modifiable(actor, post_id).await?;

        let title = normalize_title(&req.title)?;
        let content = normalize_content(&req.content)?;

        let (image, replaced) = match req.image {
            Some(upload) => (Some(self.store_image(upload.validate()?).await?), post.image),
            None => (post.image, None),
        };

        let updated = self
            .repo
            .update_post(
                post_id,
                PostPatch {
                    title,
                    content,
                    image,
                },
            )
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        if let Some(previous) = replaced {
            self.discard_image(&previous).await;
        }
        Ok(updated)
    }

    /// Loads the post and applies the owner-or-admin rule.
    async fn find_modifiable(&self, actor: Principal, post_id: i64) -> Result<Post, DomainError> {
        let post = self
            .repo
            .get_post(post_id)
            .await?
            .ok_or(DomainError::validation("post_id", "post not found"))?;

        if !actor.may_modify(post.author_id) {
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    async fn store_image(&self, image: ValidatedImage) -> Result<String, DomainError> {
        let file_name = generate_file_name(image.extension);
        self.media
            .write(&file_name, &image.bytes)
            .await
            .map_err(|err| {
                error!(file = %file_name, error = %err, "failed to save image file");
                DomainError::Unexpected(err.to_string())
            })?;
        Ok(file_name)
    }

    async fn discard_image(&self, file_name: &str) {
        match self.media.remove(file_name).await {
            Ok(()) => info!(file = %file_name, "image file deleted"),
            Err(err) => warn!(
                file = %file_name,
                error = %err,
                "failed to delete image file, it might not exist"
            ),
        }
    }
}
