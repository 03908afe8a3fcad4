use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    create_post, delete_post, get_post, list_posts, update_post,
};
use crate::presentation::middleware::auth::require_session;

pub(crate) fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post));

    let protected = Router::new()
        .route("/post", post(create_post))
        .route("/post/{id}", put(update_post).delete(delete_post))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            require_session,
        ));

    public.merge(protected)
}
