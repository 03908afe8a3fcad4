use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::domain::user::{Principal, Role};
use crate::infrastructure::jwt::JwtService;
use crate::presentation::app_error::AppError;

pub(crate) const SESSION_COOKIE: &str = "jwt_token";

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// Resolves the session cookie into a [`Principal`] for downstream handlers.
pub(crate) async fn require_session(
    State(jwt): State<Arc<JwtService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = authenticate(&jwt, request.headers())?;
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Like [`require_session`], but only lets administrators through.
pub(crate) async fn require_admin(
    State(jwt): State<Arc<JwtService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = authenticate(&jwt, request.headers())?;
    if principal.role != Role::Admin {
        warn!(
            user_id = principal.user_id,
            method = %request.method(),
            path = %request.uri().path(),
            "non-admin user attempted to access admin route"
        );
        return Err(AppError::Forbidden);
    }
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

fn authenticate(jwt: &JwtService, headers: &HeaderMap) -> Result<Principal, AppError> {
    let token = session_token(headers)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let claims = jwt.verify_token(token).map_err(|err| {
        debug!(error = %err, "session token rejected");
        AppError::Unauthorized
    })?;

    Ok(Principal::new(claims.user_id, claims.role))
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .map(str::trim)
        .find_map(|cookie| {
            let (key, value) = cookie.split_once('=')?;
            (key.trim() == SESSION_COOKIE).then(|| value.trim())
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        middleware,
        routing::get,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use super::{require_admin, require_session};
    use crate::domain::user::{Principal, Role};
    use crate::infrastructure::jwt::JwtService;

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new("0123456789abcdef0123456789abcdef", 12 * 60 * 60))
    }

    fn app(jwt: Arc<JwtService>) -> Router {
        let session = Router::new()
            .route(
                "/me",
                get(|principal: Principal| async move { principal.user_id.to_string() }),
            )
            .layer(middleware::from_fn_with_state(jwt.clone(), require_session));
        let admin = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(jwt, require_admin));

        session.merge(admin)
    }

    async fn call(app: Router, uri: &str, cookie: Option<String>) -> StatusCode {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.oneshot(request.body(Body::empty()).expect("request"))
            .await
            .expect("router is infallible")
            .status()
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthorized() {
        assert_eq!(call(app(jwt()), "/me", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            call(app(jwt()), "/me", Some("theme=dark".to_string())).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(app(jwt()), "/me", Some("jwt_token=".to_string())).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn valid_cookie_reaches_handler_among_other_cookies() {
        let jwt = jwt();
        let token = jwt.generate_token(42, Role::User).expect("token");

        let response = app(jwt)
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(header::COOKIE, format!("theme=dark; jwt_token={token}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn expired_or_forged_cookie_is_unauthorized() {
        let jwt = jwt();
        let expired = jwt
            .generate_token_at(1, Role::Admin, Utc::now() - Duration::hours(13))
            .expect("token");
        let forged = JwtService::new("another-secret-another-secret-000", 3600)
            .generate_token(1, Role::Admin)
            .expect("token");

        for token in [expired, forged, "not-a-jwt".to_string()] {
            assert_eq!(
                call(app(jwt.clone()), "/me", Some(format!("jwt_token={token}"))).await,
                StatusCode::UNAUTHORIZED
            );
        }
    }

    #[tokio::test]
    async fn admin_route_distinguishes_forbidden_from_unauthorized() {
        let jwt = jwt();
        let user = jwt.generate_token(2, Role::User).expect("token");
        let admin = jwt.generate_token(1, Role::Admin).expect("token");

        assert_eq!(call(app(jwt.clone()), "/admin", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            call(app(jwt.clone()), "/admin", Some(format!("jwt_token={user}"))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            call(app(jwt), "/admin", Some(format!("jwt_token={admin}"))).await,
            StatusCode::OK
        );
    }
}
