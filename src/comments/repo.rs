use async_trait::async_trait;

use crate::comments::repo_types::Comment;
use crate::store::{PgStore, StoreResult};

/// Postgres' default name for the `comments.post_id` foreign key.
pub const POST_FK: &str = "comments_post_id_fkey";

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn create_comment(&self, user_id: i64, post_id: i64, content: &str)
        -> StoreResult<Comment>;

    async fn list_comments(&self) -> StoreResult<Vec<Comment>>;

    async fn list_post_comments(&self, post_id: i64) -> StoreResult<Vec<Comment>>;
}

#[async_trait]
impl CommentRepo for PgStore {
    async fn create_comment(
        &self,
        user_id: i64,
        post_id: i64,
        content: &str,
    ) -> StoreResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH c AS (
                INSERT INTO comments (content, post_id, user_id)
                VALUES ($1, $2, $3)
                RETURNING id, content, post_id, user_id, created_at
            )
            SELECT c.id, c.content, c.post_id, c.user_id, u.username AS author, c.created_at
            FROM c
            LEFT JOIN users u ON u.id = c.user_id
            "#,
        )
        .bind(content)
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(comment)
    }

    async fn list_comments(&self) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.content, c.post_id, c.user_id, u.username AS author, c.created_at
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            ORDER BY c.created_at, c.id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_post_comments(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.content, c.post_id, c.user_id, u.username AS author, c.created_at
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at, c.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
