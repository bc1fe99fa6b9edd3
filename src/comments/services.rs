use tracing::info;

use crate::{
    auth::extractors::AuthContext,
    comments::{
        repo::{CommentRepo, POST_FK},
        repo_types::Comment,
    },
    error::ApiError,
    posts,
    store::{Store, StoreError},
};

pub async fn create_comment(
    store: &dyn Store,
    actor: &AuthContext,
    post_id: i64,
    content: &str,
) -> Result<Comment, ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::InvalidRequest("content is required".into()));
    }
    posts::services::get_post(store, post_id).await?;

    let comment = store
        .create_comment(actor.user_id(), post_id, content)
        .await
        .map_err(|e| match e {
            // the post was deleted between the lookup and the insert
            StoreError::ForeignKeyViolation(ref c) if c == POST_FK => ApiError::NotFound("post"),
            other => other.into(),
        })?;
    info!(comment_id = comment.id, post_id, user_id = actor.user_id(), "comment created");
    Ok(comment)
}

pub async fn list_comments(store: &dyn Store) -> Result<Vec<Comment>, ApiError> {
    Ok(store.list_comments().await?)
}

pub async fn list_post_comments(store: &dyn Store, post_id: i64) -> Result<Vec<Comment>, ApiError> {
    posts::services::get_post(store, post_id).await?;
    Ok(store.list_post_comments(post_id).await?)
}
