use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthContext,
    error::ApiError,
    extract::{ApiPath, JsonOrForm},
    posts::{
        dto::{MessageResponse, PostListResponse, PostRequest, PostResponse},
        services,
    },
    state::AppState,
};

/// Mounted under the guarded `/api/protected` prefix.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/post/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    _ctx: AuthContext,
) -> Result<Json<PostListResponse>, ApiError> {
    let posts = services::list_posts(state.store.as_ref()).await?;
    Ok(Json(PostListResponse {
        message: "posts fetched",
        count: posts.len(),
        data: posts,
    }))
}

#[instrument(skip(state, payload), fields(user_id = ctx.user_id()))]
pub async fn create_post(
    State(state): State<AppState>,
    ctx: AuthContext,
    JsonOrForm(payload): JsonOrForm<PostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let draft = payload.into_draft()?;
    let post = services::create_post(state.store.as_ref(), &ctx, draft).await?;
    Ok(Json(PostResponse {
        message: "post created",
        data: post,
    }))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    _ctx: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = services::get_post(state.store.as_ref(), id).await?;
    Ok(Json(PostResponse {
        message: "post fetched",
        data: post,
    }))
}

#[instrument(skip(state, payload), fields(user_id = ctx.user_id()))]
pub async fn update_post(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<i64>,
    JsonOrForm(payload): JsonOrForm<PostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let draft = payload.into_draft()?;
    let post = services::update_post(state.store.as_ref(), &ctx, id, draft).await?;
    Ok(Json(PostResponse {
        message: "post updated",
        data: post,
    }))
}

#[instrument(skip(state), fields(user_id = ctx.user_id()))]
pub async fn delete_post(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_post(state.store.as_ref(), &ctx, id).await?;
    Ok(Json(MessageResponse {
        message: "post deleted",
    }))
}
