use std::net::SocketAddr;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{handlers as auth_handlers, middleware::require_auth};
use crate::state::AppState;
use crate::{comments, posts};

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth_handlers::account_routes())
        .merge(posts::routes())
        .merge(comments::routes())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(|| async { "ok" }))
        .nest(
            "/api",
            Router::new()
                .merge(auth_handlers::auth_routes())
                .nest("/protected", protected),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Scribe blog API" }))
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
