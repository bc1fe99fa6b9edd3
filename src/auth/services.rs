use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    error::ApiError,
    state::AppState,
};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_registration(req: &mut RegisterRequest) -> Result<(), ApiError> {
    req.username = req.username.trim().to_string();
    req.email = req.email.trim().to_lowercase();

    if req.username.chars().count() < MIN_USERNAME_LEN {
        return Err(ApiError::InvalidRequest(format!(
            "username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    if !is_valid_email(&req.email) {
        return Err(ApiError::InvalidRequest("invalid email".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn register(state: &AppState, mut req: RegisterRequest) -> Result<User, ApiError> {
    validate_registration(&mut req)?;

    // A failed lookup is an error, not evidence that the name is free.
    match state
        .store
        .find_by_username_or_email(&req.username, &req.email)
        .await
    {
        Ok(Some(_)) => {
            warn!(username = %req.username, "username or email already registered");
            return Err(ApiError::Conflict);
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "duplicate check failed");
            return Err(e.into());
        }
    }

    let password_hash = state.hasher.hash_blocking(req.password).await?;

    // The unique indexes still catch a concurrent registration.
    let user = state
        .store
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<LoginResponse, ApiError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidRequest(
            "username and password are required".into(),
        ));
    }

    let Some(user) = state.store.find_by_username(username).await? else {
        state.hasher.verify_decoy_blocking(req.password).await?;
        warn!(%username, "login for unknown user");
        return Err(ApiError::InvalidCredentials);
    };

    let ok = state
        .hasher
        .verify_blocking(req.password, user.password_hash.clone())
        .await?;
    if !ok {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.keys.issue(user.id, &user.username)?;

    info!(user_id = user.id, "user logged in");
    Ok(LoginResponse {
        state: 0,
        message: "login successful",
        data: user.into(),
        token,
    })
}
