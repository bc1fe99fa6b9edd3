//! Creator-only mutation rule for posts.

use tracing::warn;

use crate::{auth::extractors::AuthContext, error::ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Permitted,
    Forbidden,
}

/// `Permitted` iff the resource has a recorded creator and it is `actor`.
pub fn check(owner: Option<i64>, actor: i64) -> Access {
    match owner {
        Some(owner) if owner == actor => Access::Permitted,
        _ => Access::Forbidden,
    }
}

pub fn ensure_owner(owner: Option<i64>, actor: &AuthContext) -> Result<(), ApiError> {
    match check(owner, actor.user_id()) {
        Access::Permitted => Ok(()),
        Access::Forbidden => {
            warn!(owner = ?owner, actor = actor.user_id(), "ownership check failed");
            Err(ApiError::Forbidden)
        }
    }
}
