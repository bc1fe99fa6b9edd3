use serde::{Deserialize, Serialize};

use crate::{error::ApiError, posts::repo_types::{Post, PostDraft}};

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl PostRequest {
    /// Both fields are required and may not be blank.
    pub fn into_draft(self) -> Result<PostDraft, ApiError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::InvalidRequest("title is required".into()));
        }
        if self.content.trim().is_empty() {
            return Err(ApiError::InvalidRequest("content is required".into()));
        }
        Ok(PostDraft {
            title,
            content: self.content,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub message: &'static str,
    pub data: Vec<Post>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub message: &'static str,
    pub data: Post,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
