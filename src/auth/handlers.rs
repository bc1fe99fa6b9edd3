use axum::{extract::State, routing::get, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse,
            UsersResponse,
        },
        extractors::AuthContext,
        repo::UserRepo,
        services,
    },
    error::ApiError,
    extract::JsonOrForm,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Mounted under the guarded `/api/protected` prefix.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/users", get(list_users))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonOrForm(payload): JsonOrForm<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let user = services::register(&state, payload).await?;
    Ok(Json(RegisterResponse {
        message: "registration successful",
        data: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonOrForm(payload): JsonOrForm<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(services::login(&state, payload).await?))
}

#[instrument(skip_all, fields(user_id = ctx.user_id()))]
pub async fn profile(ctx: AuthContext) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user_id: ctx.user_id(),
        username: ctx.username().to_string(),
        message: "this is a protected resource",
    })
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _ctx: AuthContext,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(UsersResponse {
        message: "users fetched",
        data: users.into_iter().map(Into::into).collect(),
    }))
}
