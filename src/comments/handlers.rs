use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::extractors::AuthContext,
    comments::{
        dto::{CommentListResponse, CommentRequest, CommentResponse},
        services,
    },
    error::ApiError,
    extract::{ApiPath, JsonOrForm},
    state::AppState,
};

/// Mounted under the guarded `/api/protected` prefix.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/comments", get(list_comments).post(create_comment))
        .route("/post/:id/comments", get(list_post_comments))
}

#[instrument(skip(state, payload), fields(user_id = ctx.user_id()))]
pub async fn create_comment(
    State(state): State<AppState>,
    ctx: AuthContext,
    JsonOrForm(payload): JsonOrForm<CommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment =
        services::create_comment(state.store.as_ref(), &ctx, payload.post_id, &payload.content)
            .await?;
    Ok(Json(CommentResponse {
        message: "comment created",
        data: comment,
    }))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    _ctx: AuthContext,
) -> Result<Json<CommentListResponse>, ApiError> {
    let comments = services::list_comments(state.store.as_ref()).await?;
    Ok(Json(CommentListResponse {
        message: "comments fetched",
        data: comments,
    }))
}

#[instrument(skip(state))]
pub async fn list_post_comments(
    State(state): State<AppState>,
    _ctx: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let comments = services::list_post_comments(state.store.as_ref(), id).await?;
    Ok(Json(CommentListResponse {
        message: "comments fetched",
        data: comments,
    }))
}
