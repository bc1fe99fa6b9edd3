use serde::{Deserialize, Serialize};

use crate::comments::repo_types::Comment;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
    pub post_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub message: &'static str,
    pub data: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub message: &'static str,
    pub data: Comment,
}
