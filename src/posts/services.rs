//! Post operations. Mutations run `fetch -> ownership -> mutate`; each step
//! ends the request with its own outcome (404, 403, 500) on failure.
//!
//! There is no version column: two owners' concurrent updates are
//! last-write-wins.

use tracing::{info, warn};

use crate::{
    auth::extractors::AuthContext,
    error::ApiError,
    posts::{
        policy,
        repo::PostRepo,
        repo_types::{Post, PostDraft},
    },
    store::Store,
};

pub async fn create_post(
    store: &dyn Store,
    actor: &AuthContext,
    draft: PostDraft,
) -> Result<Post, ApiError> {
    let post = store.create_post(actor.user_id(), draft).await?;
    info!(post_id = post.id, user_id = actor.user_id(), "post created");
    Ok(post)
}

pub async fn list_posts(store: &dyn Store) -> Result<Vec<Post>, ApiError> {
    Ok(store.list_posts().await?)
}

pub async fn get_post(store: &dyn Store, id: i64) -> Result<Post, ApiError> {
    store.find_post(id).await?.ok_or_else(|| {
        warn!(post_id = id, "post not found");
        ApiError::NotFound("post")
    })
}

pub async fn update_post(
    store: &dyn Store,
    actor: &AuthContext,
    id: i64,
    draft: PostDraft,
) -> Result<Post, ApiError> {
    let existing = get_post(store, id).await?;
    policy::ensure_owner(existing.user_id, actor)?;

    // Filtered on the owner again; a row that vanished meanwhile is a 404.
    let post = store
        .update_post(id, actor.user_id(), draft)
        .await?
        .ok_or(ApiError::NotFound("post"))?;
    info!(post_id = id, user_id = actor.user_id(), "post updated");
    Ok(post)
}

pub async fn delete_post(store: &dyn Store, actor: &AuthContext, id: i64) -> Result<(), ApiError> {
    let existing = get_post(store, id).await?;
    policy::ensure_owner(existing.user_id, actor)?;

    if !store.delete_post(id, actor.user_id()).await? {
        return Err(ApiError::NotFound("post"));
    }
    info!(post_id = id, user_id = actor.user_id(), "post deleted");
    Ok(())
}
