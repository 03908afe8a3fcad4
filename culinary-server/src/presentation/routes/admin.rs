use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, put};

use crate::presentation::AppState;
use crate::presentation::handlers::admin::{delete_user, list_users, update_role, user_stats};
use crate::presentation::middleware::auth::require_admin;

pub(crate) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/stats", get(user_stats))
        .route("/users/{id}/role", put(update_role))
        .route("/users/{id}", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            require_admin,
        ))
}
