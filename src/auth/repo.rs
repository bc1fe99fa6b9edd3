use async_trait::async_trait;

use crate::auth::repo_types::{NewUser, User};
use crate::store::{PgStore, StoreResult};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Any user holding either the username or the email.
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Option<User>>;

    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1 OR email = $2
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }
}
