use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{auth::jwt::Claims, error::ApiError};

/// Identity of a verified caller. Inserted into request extensions by
/// [`require_auth`](super::middleware::require_auth) and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: i64,
    username: String,
}

impl AuthContext {
    pub(crate) fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[cfg(test)]
impl AuthContext {
    pub(crate) fn for_tests(user_id: i64, username: &str) -> Self {
        Self {
            user_id,
            username: username.to_string(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A route mounted outside the guard has no context: reject.
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(ApiError::MissingToken)
    }
}
