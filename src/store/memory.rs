use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    comments::{
        repo::{CommentRepo, POST_FK},
        repo_types::Comment,
    },
    posts::{
        repo::PostRepo,
        repo_types::{Post, PostDraft},
    },
    store::{StoreError, StoreResult},
};

/// Map-backed store with the same constraints as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

/// How `find_by_username_or_email` behaves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup {
    #[default]
    Normal,
    /// The database is unreachable.
    Fails,
    /// Sees no rows, as when another registration commits right after it.
    Stale,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    next_id: i64,
    user_lookup: UserLookup,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username_of(&self, user_id: Option<i64>) -> Option<String> {
        let id = user_id?;
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.clone())
    }
}

impl MemoryStore {
    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.inner.lock().expect("memory store poisoned")
    }

    pub async fn seed_user(&self, username: &str) -> i64 {
        self.create_user(NewUser {
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash: "unused".into(),
        })
        .await
        .expect("seed user")
        .id
    }

    pub fn set_user_lookup(&self, mode: UserLookup) {
        self.tables().user_lookup = mode;
    }

    /// Drops the creator link, as if the account had been removed.
    pub async fn orphan_post(&self, id: i64) {
        let mut t = self.tables();
        if let Some(p) = t.posts.iter_mut().find(|p| p.id == id) {
            p.user_id = None;
            p.author = None;
        }
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Option<User>> {
        let t = self.tables();
        match t.user_lookup {
            UserLookup::Normal => Ok(t
                .users
                .iter()
                .find(|u| u.username == username || u.email == email)
                .cloned()),
            UserLookup::Fails => Err(StoreError::Database(sqlx::Error::PoolTimedOut)),
            UserLookup::Stale => Ok(None),
        }
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables();
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation("users_username_key".into()));
        }
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".into()));
        }
        let user = User {
            id: t.next_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables().users.clone())
    }
}

#[async_trait]
impl PostRepo for MemoryStore {
    async fn create_post(&self, user_id: i64, draft: PostDraft) -> StoreResult<Post> {
        let mut t = self.tables();
        if !t.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::ForeignKeyViolation("posts_user_id_fkey".into()));
        }
        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: t.next_id(),
            title: draft.title,
            content: draft.content,
            user_id: Some(user_id),
            author: t.username_of(Some(user_id)),
            created_at: now,
            updated_at: now,
        };
        t.posts.push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let mut posts = self.tables().posts.clone();
        posts.reverse();
        Ok(posts)
    }

    async fn find_post(&self, id: i64) -> StoreResult<Option<Post>> {
        Ok(self.tables().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn update_post(
        &self,
        id: i64,
        user_id: i64,
        draft: PostDraft,
    ) -> StoreResult<Option<Post>> {
        let mut t = self.tables();
        let Some(post) = t
            .posts
            .iter_mut()
            .find(|p| p.id == id && p.user_id == Some(user_id))
        else {
            return Ok(None);
        };
        post.title = draft.title;
        post.content = draft.content;
        post.updated_at = OffsetDateTime::now_utc();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let mut t = self.tables();
        let before = t.posts.len();
        t.posts.retain(|p| !(p.id == id && p.user_id == Some(user_id)));
        let deleted = t.posts.len() < before;
        if deleted {
            t.comments.retain(|c| c.post_id != id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn create_comment(
        &self,
        user_id: i64,
        post_id: i64,
        content: &str,
    ) -> StoreResult<Comment> {
        let mut t = self.tables();
        if !t.posts.iter().any(|p| p.id == post_id) {
            return Err(StoreError::ForeignKeyViolation(POST_FK.into()));
        }
        if !t.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::ForeignKeyViolation("comments_user_id_fkey".into()));
        }
        let comment = Comment {
            id: t.next_id(),
            content: content.to_string(),
            post_id,
            user_id: Some(user_id),
            author: t.username_of(Some(user_id)),
            created_at: OffsetDateTime::now_utc(),
        };
        t.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self) -> StoreResult<Vec<Comment>> {
        Ok(self.tables().comments.clone())
    }

    async fn list_post_comments(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        Ok(self
            .tables()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}
