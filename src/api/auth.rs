//! Token login, registration and the caller's profile

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::user::{CreateUser, LoginRequest, LoginResponse, UserDetail},
    AppState,
};

use super::{AuthenticatedUser, Payload};

/// Exchange username and password for an API token
#[utoipa::path(
    post,
    path = "/token/login/",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Payload(request): Payload<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state.services.auth.login(&request).await?;
    Ok(Json(response))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/users/",
    tag = "auth",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User registered", body = UserDetail),
        (status = 400, description = "Invalid input or username taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Payload(request): Payload<CreateUser>,
) -> AppResult<(StatusCode, Json<UserDetail>)> {
    let user = state.services.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/user/details/",
    tag = "auth",
    security(("token_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserDetail),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> AppResult<Json<UserDetail>> {
    let user = state.services.auth.me(caller).await?;
    Ok(Json(user))
}
