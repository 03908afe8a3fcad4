use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::admin::{UpdateRoleDto, UserStatsDto};
use crate::presentation::handlers::auth::{LoginDto, RegisterDto, UserDto};
use crate::presentation::handlers::posts::{
    ListPostsResponseDto, PostDetailDto, PostDto, PostFormDto,
};
use crate::presentation::middleware::auth::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::logout,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::admin::list_users,
        crate::presentation::handlers::admin::user_stats,
        crate::presentation::handlers::admin::update_role,
        crate::presentation::handlers::admin::delete_user
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            UserDto,
            PostFormDto,
            PostDto,
            PostDetailDto,
            ListPostsResponseDto,
            UpdateRoleDto,
            UserStatsDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and cookie sessions"),
        (name = "posts", description = "Recipe posts with optional image"),
        (name = "admin", description = "User management, admin role only")
    ),
    modifiers(&SessionCookieAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            SESSION_COOKIE,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
        openapi.components = Some(components);
    }
}
