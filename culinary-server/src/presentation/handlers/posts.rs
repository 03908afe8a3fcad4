use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::blog_service::ListPostsResult;
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, ImageUpload, Post, PostDetail, UpdatePostRequest};
use crate::domain::user::Principal;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

/// Query values stay raw strings so a non-numeric value becomes a field
/// validation error instead of a generic rejection.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListPostsQuery {
    pub(crate) page: Option<String>,
    pub(crate) limit: Option<String>,
}

/// Multipart form accepted by create and update.
#[derive(Debug, ToSchema)]
pub(crate) struct PostFormDto {
    pub(crate) title: String,
    pub(crate) content: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub(crate) image: Option<ImageUpload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) author: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDetailDto>,
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) count: usize,
    pub(crate) total: i64,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            image: post.image,
            created_at: post.created_at,
        }
    }
}

impl From<PostDetail> for PostDetailDto {
    fn from(post: PostDetail) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            author: post.author,
            title: post.title,
            content: post.content,
            image: post.image,
            created_at: post.created_at,
        }
    }
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        let posts: Vec<PostDetailDto> = result.posts.into_iter().map(Into::into).collect();
        Self {
            count: posts.len(),
            posts,
            page: result.page,
            limit: result.limit,
            total: result.total,
        }
    }
}

/// Unknown fields are skipped. An image part with neither a file name nor
/// bytes is what browsers send for an empty file input.
async fn read_post_form(mut multipart: Multipart) -> AppResult<PostFormDto> {
    let mut form = PostFormDto {
        title: String::new(),
        content: String::new(),
        image: None,
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = field.text().await?,
            "content" => form.content = field.text().await?,
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !(file_name.is_empty() && bytes.is_empty()) {
                    form.image = Some(ImageUpload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn parse_number(field: &'static str, raw: Option<&str>, default: i64) -> AppResult<i64> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| DomainError::validation(field, "must be a number").into()),
    }
}

#[utoipa::path(
    get,
    path = "/v1/posts",
    tag = "posts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, values below 1 become 1"),
        ("limit" = Option<i64>, Query, description = "Items per page (1..=100), otherwise 10")
    ),
    responses(
        (status = 200, description = "Posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Non-numeric page or limit"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> AppResult<Json<ListPostsResponseDto>> {
    let Query(query) = query?;
    let page = parse_number("page", query.page.as_deref(), DEFAULT_PAGE)?;
    let limit = parse_number("limit", query.limit.as_deref(), DEFAULT_LIMIT)?;

    let result = state.blog_service.list_posts(page, limit).await?;

    Ok(Json(result.into()))
}

#[utoipa::path(
    get,
    path = "/v1/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDetailDto),
        (status = 400, description = "Non-numeric id"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<PostDetailDto>> {
    let Path(id) = id?;
    let post = state.blog_service.get_post(id).await?;

    Ok(Json(post.into()))
}

#[utoipa::path(
    post,
    path = "/v1/post",
    tag = "posts",
    security(
        ("jwt_token" = [])
    ),
    request_body(content = PostFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Session invalid"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let form = read_post_form(multipart?).await?;
    let req = CreatePostRequest {
        title: form.title,
        content: form.content,
        image: form.image,
    };

    let post = state
        .blog_service
        .create_post(principal.user_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

#[utoipa::path(
    put,
    path = "/v1/post/{id}",
    tag = "posts",
    security(
        ("jwt_token" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body(content = PostFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error or post not found"),
        (status = 401, description = "Session invalid"),
        (status = 403, description = "Not the owner and not an admin"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    principal: Principal,
    id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<PostDto>> {
    let Path(id) = id?;
    let form = read_post_form(multipart?).await?;
    let req = UpdatePostRequest {
        title: form.title,
        content: form.content,
        image: form.image,
    };

    let post = state.blog_service.update_post(principal, id, req).await?;
    Ok(Json(post.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/post/{id}",
    tag = "posts",
    security(
        ("jwt_token" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 400, description = "Post not found"),
        (status = 401, description = "Session invalid"),
        (status = 403, description = "Not the owner and not an admin"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    principal: Principal,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.blog_service.delete_post(principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
