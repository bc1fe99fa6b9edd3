use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Post row joined with its author's username.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: Option<i64>, // creator; NULL only if the account is gone
    pub author: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}
