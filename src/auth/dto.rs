use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login credentials, from form fields or JSON.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            user_name: u.username,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub data: UserResponse,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub state: u8,
    pub message: &'static str,
    pub data: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub message: &'static str,
    pub data: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub username: String,
    pub message: &'static str,
}
