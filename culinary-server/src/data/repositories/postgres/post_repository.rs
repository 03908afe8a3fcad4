use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::error;

use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDetail};
use crate::infrastructure::database::DbPools;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pools: DbPools,
}

impl PostgresPostRepository {
    pub(crate) fn new(pools: DbPools) -> Self {
        Self { pools }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostDetailRow {
    id: i64,
    user_id: i64,
    username: String,
    title: String,
    content: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (user_id, title, content, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, content, image, created_at
            "#,
        )
        .bind(input.author_id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.image)
        .fetch_one(&self.pools.write)
        .await
        .map_err(|err| map_post_db_error("posts.create", err))?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
            id,
            user_id,
            title,
            content,
            image,
            created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pools.read)
        .await
        .map_err(|err| map_post_db_error("posts.get", err))?;

        row.map(map_row_to_post).transpose()
    }

    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError> {
        let row = sqlx::query_as::<_, PostDetailRow>(
            r#"
            SELECT
                p.id,
                p.user_id,
                u.username,
                p.title,
                p.content,
                p.image,
                p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pools.read)
        .await
        .map_err(|err| map_post_db_error("posts.get_detail", err))?;

        Ok(row.map(PostDetail::from))
    }

    async fn update_post(
        &self,
        post_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = $2,
                content = $3,
                image = $4
            WHERE id = $1
            RETURNING id, user_id, title, content, image, created_at
            "#,
        )
        .bind(post_id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.image)
        .fetch_optional(&self.pools.write)
        .await
        .map_err(|err| map_post_db_error("posts.update", err))?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pools.write)
        .await
        .map_err(|err| map_post_db_error("posts.delete", err))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<PostDetail>, DomainError> {
        let rows = sqlx::query_as::<_, PostDetailRow>(
            r#"
            SELECT
                p.id,
                p.user_id,
                u.username,
                p.title,
                p.content,
                p.image,
                p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1
            OFFSET $2
            "#,
        )
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&self.pools.read)
        .await
        .map_err(|err| map_post_db_error("posts.list", err))?;

        Ok(rows.into_iter().map(PostDetail::from).collect())
    }

    async fn total_posts(&self) -> Result<i64, DomainError> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            r#"
            SELECT COUNT(*)
            FROM posts
            "#,
        )
        .fetch_one(&self.pools.read)
        .await
        .map_err(|err| map_post_db_error("posts.count", err))?;

        Ok(count)
    }
}

impl From<PostDetailRow> for PostDetail {
    fn from(row: PostDetailRow) -> Self {
        Self {
            id: row.id,
            author_id: row.user_id,
            author: row.username,
            title: row.title,
            content: row.content,
            image: row.image.filter(|name| !name.is_empty()),
            created_at: row.created_at,
        }
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(
        row.id,
        row.user_id,
        row.title,
        row.content,
        row.image,
        row.created_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(operation: &'static str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("author".to_string());
    }
    error!(operation, error = %err, "post storage operation failed");
    DomainError::Unexpected(err.to_string())
}
