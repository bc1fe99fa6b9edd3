use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    auth::{extractors::AuthContext, jwt::JwtKeys},
    error::ApiError,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Raw credential from the `Authorization` header. The `Bearer ` prefix is
/// optional; without it the whole value is taken as the token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value);
    (!token.is_empty()).then_some(token)
}

/// Guard for protected routes. Rejects before the handler runs unless the
/// request carries a valid token, then exposes the caller as [`AuthContext`].
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(req.headers()) else {
        warn!(uri = %req.uri(), "missing access token");
        return Err(ApiError::MissingToken);
    };

    let claims = keys.verify(token).map_err(|reason| {
        warn!(uri = %req.uri(), %reason, "rejected access token");
        ApiError::InvalidToken
    })?;

    req.extensions_mut().insert(AuthContext::from_claims(claims));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use axum::{
        body::{to_bytes, Body},
        http::{HeaderValue, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use time::{Duration, OffsetDateTime};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::jwt::test_keys;

    fn guarded(keys: JwtKeys, hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(move |ctx: AuthContext| {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        format!("{}:{}", ctx.user_id(), ctx.username())
                    }
                }),
            )
            .layer(from_fn_with_state(keys, require_auth))
    }

    async fn call(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut req = axum::http::Request::builder().uri("/whoami");
        if let Some(v) = auth {
            req = req.header(AUTHORIZATION, v);
        }
        let res = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn bearer_prefix_is_optional() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static(""));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn valid_token_reaches_the_handler_with_identity() {
        let keys = test_keys("guard-secret");
        let token = keys.issue(9, "dana").unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let header = format!("Bearer {token}");
        let (status, body) = call(guarded(keys, hits.clone()), Some(header.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "9:dana");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_without_prefix_is_accepted() {
        let keys = test_keys("guard-secret");
        let token = keys.issue(9, "dana").unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let (status, _) = call(guarded(keys, hits.clone()), Some(token.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_header_never_reaches_the_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (status, body) = call(guarded(test_keys("guard-secret"), hits.clone()), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["code"], 401);
        assert_eq!(json["message"], "missing access token");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bad_tokens_never_reach_the_handler() {
        let keys = test_keys("guard-secret");
        let foreign = test_keys("someone-else").issue(1, "mallory").unwrap();
        let expired = keys
            .issue_at(1, "dana", OffsetDateTime::now_utc() - Duration::days(2))
            .unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        for bad in [
            "Bearer garbage".to_string(),
            format!("Bearer {foreign}"),
            format!("Bearer {expired}"),
        ] {
            let (status, body) = call(guarded(keys.clone(), hits.clone()), Some(bad.as_str())).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            // Every verification failure looks the same to the client.
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(json["message"], "invalid or expired access token");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn context_extractor_fails_closed_without_the_guard() {
        let app = Router::new().route(
            "/open",
            get(|ctx: AuthContext| async move { ctx.user_id().to_string() }),
        );
        let res = app
            .oneshot(axum::http::Request::builder().uri("/open").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
