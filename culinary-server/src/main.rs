use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::admin_service::AdminService;
use application::auth_service::AuthService;
use application::blog_service::BlogService;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pools, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::media_store::LocalMediaStore;
use infrastructure::password::PasswordService;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pools = create_pools(
        &settings.database_url,
        &settings.database_read_url,
        settings.db_max_connections,
    )
    .await?;
    run_migrations(&pools).await?;

    let media = LocalMediaStore::new(settings.upload_dir.clone());
    media
        .ensure_root()
        .await
        .with_context(|| format!("can't create upload dir {}", media.root().display()))?;
    info!(upload_dir = %media.root().display(), "media store ready");

    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    ));
    let user_repo = PostgresUserRepository::new(pools.clone());
    let post_repo = PostgresPostRepository::new(pools);

    let state = AppState::new(
        Arc::new(AuthService::new(
            user_repo.clone(),
            jwt.clone(),
            PasswordService::new(),
        )),
        Arc::new(AdminService::new(user_repo)),
        Arc::new(BlogService::new(post_repo, media)),
        jwt,
        settings.cookie_secure,
    );

    server::run_http(&settings, state).await
}
