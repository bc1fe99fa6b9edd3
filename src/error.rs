use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::store::StoreError;

/// Every failure a request can end with. Each variant maps to exactly one
/// status, message and details triple.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("missing access token")]
    MissingToken,

    #[error("invalid or expired access token")]
    InvalidToken,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("username or email already exists")]
    Conflict,

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Uniform error body: `{code, message, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingToken | Self::InvalidToken | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid request parameters",
            Self::MissingToken => "missing access token",
            Self::InvalidToken => "invalid or expired access token",
            Self::InvalidCredentials => "invalid username or password",
            Self::Forbidden => "you do not have permission to perform this action",
            Self::NotFound(_) => "resource not found",
            Self::Conflict => "username or email already exists",
            Self::Internal(_) => "internal server error",
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::InvalidRequest(details) => Some(details.clone()),
            Self::MissingToken | Self::InvalidToken => {
                Some("a valid bearer token is required".into())
            }
            Self::InvalidCredentials => None,
            Self::Forbidden => Some("only the author may modify this resource".into()),
            Self::NotFound(what) => Some(format!("{what} not found")),
            Self::Conflict => None,
            Self::Internal(_) => {
                Some("the server encountered an unexpected condition".into())
            }
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.status_code().as_u16(),
            message: self.message(),
            details: self.details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            error!(error = %format!("{e:#}"), "request failed");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(_) => Self::Conflict,
            StoreError::ForeignKeyViolation(_) => Self::NotFound("referenced record"),
            StoreError::Database(e) => Self::Internal(anyhow::Error::new(e).context("database")),
        }
    }
}
