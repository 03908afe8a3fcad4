use std::sync::Arc;

use crate::application::admin_service::AdminService;
use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::media_store::LocalMediaStore;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<PostgresUserRepository>>,
    pub(crate) admin_service: Arc<AdminService<PostgresUserRepository>>,
    pub(crate) blog_service: Arc<BlogService<PostgresPostRepository, LocalMediaStore>>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) cookie_secure: bool,
}

impl AppState {
    pub(crate) fn new(
        auth_service: Arc<AuthService<PostgresUserRepository>>,
        admin_service: Arc<AdminService<PostgresUserRepository>>,
        blog_service: Arc<BlogService<PostgresPostRepository, LocalMediaStore>>,
        jwt: Arc<JwtService>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            auth_service,
            admin_service,
            blog_service,
            jwt,
            cookie_secure,
        }
    }
}
