use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{auth::repo::UserRepo, comments::repo::CommentRepo, posts::repo::PostRepo};

#[cfg(test)]
pub mod memory;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            if db.is_unique_violation() {
                return Self::UniqueViolation(constraint);
            }
            if db.is_foreign_key_violation() {
                return Self::ForeignKeyViolation(constraint);
            }
        }
        Self::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the handlers need from persistence. Postgres in production,
/// an in-memory map in tests.
pub trait Store: UserRepo + PostRepo + CommentRepo + Send + Sync {}

impl<T> Store for T where T: UserRepo + PostRepo + CommentRepo + Send + Sync {}

#[derive(Clone)]
pub struct PgStore {
    pub(crate) db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")
    }
}
