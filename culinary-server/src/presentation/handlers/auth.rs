use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::SESSION_COOKIE;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(length(max = 64))]
    pub(crate) username: String,
    #[validate(length(max = 128))]
    pub(crate) password: String,
    #[validate(length(max = 128))]
    pub(crate) confirm_password: String,
}

/// No field caps here: any bad input must surface as invalid credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct LoginDto {
    pub(crate) username: String,
    pub(crate) password: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    #[schema(example = "user")]
    pub(crate) role: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role.to_string(),
            created_at: user.created_at,
        }
    }
}

fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterDto>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let Json(dto) = body?;
    dto.validate()?;

    let req = RegisterRequest {
        username: dto.username,
        password: dto.password,
        confirm_password: dto.confirm_password,
    };

    let user = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = UserDto),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginDto>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(dto) = body?;

    let req = LoginRequest {
        username: dto.username,
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;
    let cookie = session_cookie(
        &result.access_token,
        state.jwt.ttl_seconds(),
        state.cookie_secure,
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UserDto::from(result.user)),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session cookie cleared")
    )
)]
pub(crate) async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(state.cookie_secure))],
    )
}

#[cfg(test)]
mod tests {
    use super::{clear_session_cookie, session_cookie};

    #[test]
    fn session_cookie_is_http_only_with_ttl() {
        let cookie = session_cookie("abc.def.ghi", 43_200, false);
        assert_eq!(
            cookie,
            "jwt_token=abc.def.ghi; HttpOnly; SameSite=Lax; Path=/; Max-Age=43200"
        );
        assert!(session_cookie("t", 60, true).ends_with("; Secure"));
    }

    #[test]
    fn cleared_cookie_is_already_expired() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.starts_with("jwt_token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(!cookie.contains("Secure"));
    }
}
