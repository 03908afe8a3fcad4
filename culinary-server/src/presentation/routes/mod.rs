use axum::{Json, Router, routing::get};
use serde::Serialize;

use super::AppState;

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod posts;

/// Versioned API plus the unversioned liveness probe.
pub(crate) fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/health", get(healthz))
        .nest("/auth", auth::router())
        .merge(posts::router(&state))
        .nest("/admin", admin::router(&state));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/v1", v1)
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
}

async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}
