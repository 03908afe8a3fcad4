use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::{Principal, UserStats};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::auth::UserDto;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserSearchQuery {
    pub(crate) search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateRoleDto {
    #[validate(length(max = 16))]
    #[schema(example = "admin")]
    pub(crate) role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserStatsDto {
    pub(crate) total_users: i64,
    pub(crate) admin_count: i64,
    pub(crate) user_count: i64,
}

impl From<UserStats> for UserStatsDto {
    fn from(stats: UserStats) -> Self {
        Self {
            total_users: stats.total_users,
            admin_count: stats.admin_count,
            user_count: stats.user_count,
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "admin",
    security(
        ("jwt_token" = [])
    ),
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive match on username or role")
    ),
    responses(
        (status = 200, description = "Users, newest first", body = [UserDto]),
        (status = 401, description = "Session invalid"),
        (status = 403, description = "Admin role required"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<UserSearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<UserDto>>> {
    let Query(query) = query?;
    let users = state
        .admin_service
        .list_users(query.search.as_deref())
        .await?;

    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/admin/users/stats",
    tag = "admin",
    security(
        ("jwt_token" = [])
    ),
    responses(
        (status = 200, description = "Account counts by role", body = UserStatsDto),
        (status = 401, description = "Session invalid"),
        (status = 403, description = "Admin role required"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn user_stats(State(state): State<AppState>) -> AppResult<Json<UserStatsDto>> {
    let stats = state.admin_service.stats().await?;
    Ok(Json(stats.into()))
}

#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}/role",
    tag = "admin",
    security(
        ("jwt_token" = [])
    ),
    params(
        ("id" = i64, Path, description = "Target user id")
    ),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = UserDto),
        (status = 400, description = "Invalid role or own account"),
        (status = 401, description = "Session invalid"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_role(
    State(state): State<AppState>,
    admin: Principal,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateRoleDto>, JsonRejection>,
) -> AppResult<Json<UserDto>> {
    let Path(id) = id?;
    let Json(dto) = body?;
    dto.validate()?;

    let user = state
        .admin_service
        .update_role(id, admin.user_id, &dto.role)
        .await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/admin/users/{id}",
    tag = "admin",
    security(
        ("jwt_token" = [])
    ),
    params(
        ("id" = i64, Path, description = "Target user id")
    ),
    responses(
        (status = 204, description = "User and their posts deleted"),
        (status = 400, description = "Own account"),
        (status = 401, description = "Session invalid"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    admin: Principal,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.admin_service.delete_user(id, admin.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
