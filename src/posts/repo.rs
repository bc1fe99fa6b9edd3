use async_trait::async_trait;

use crate::posts::repo_types::{Post, PostDraft};
use crate::store::{PgStore, StoreResult};

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn create_post(&self, user_id: i64, draft: PostDraft) -> StoreResult<Post>;

    async fn list_posts(&self) -> StoreResult<Vec<Post>>;

    async fn find_post(&self, id: i64) -> StoreResult<Option<Post>>;

    /// Rewrites a post owned by `user_id`. `None` when no such row exists.
    async fn update_post(&self, id: i64, user_id: i64, draft: PostDraft)
        -> StoreResult<Option<Post>>;

    /// Deletes a post owned by `user_id`. `false` when no such row exists.
    async fn delete_post(&self, id: i64, user_id: i64) -> StoreResult<bool>;
}

#[async_trait]
impl PostRepo for PgStore {
    async fn create_post(&self, user_id: i64, draft: PostDraft) -> StoreResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            WITH p AS (
                INSERT INTO posts (title, content, user_id)
                VALUES ($1, $2, $3)
                RETURNING id, title, content, user_id, created_at, updated_at
            )
            SELECT p.id, p.title, p.content, p.user_id, u.username AS author,
                   p.created_at, p.updated_at
            FROM p
            LEFT JOIN users u ON u.id = p.user_id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(post)
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.content, p.user_id, u.username AS author,
                   p.created_at, p.updated_at
            FROM posts p
            LEFT JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_post(&self, id: i64) -> StoreResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.content, p.user_id, u.username AS author,
                   p.created_at, p.updated_at
            FROM posts p
            LEFT JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn update_post(
        &self,
        id: i64,
        user_id: i64,
        draft: PostDraft,
    ) -> StoreResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            WITH p AS (
                UPDATE posts
                SET title = $3, content = $4, updated_at = now()
                WHERE id = $1 AND user_id = $2
                RETURNING id, title, content, user_id, created_at, updated_at
            )
            SELECT p.id, p.title, p.content, p.user_id, u.username AS author,
                   p.created_at, p.updated_at
            FROM p
            LEFT JOIN users u ON u.id = p.user_id
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.content)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn delete_post(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
