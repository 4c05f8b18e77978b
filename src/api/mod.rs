//! API handlers for Bookshelf REST endpoints

pub mod auth;
pub mod authors;
pub mod book_cards;
pub mod books;
pub mod health;
pub mod list_items;
pub mod lists;
pub mod notes;
pub mod openapi;
pub mod publishers;
pub mod tags;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{access::Caller, error::AppError, models::user::UserClaims, AppState};

/// Extract the credential from `Authorization: Token <jwt>` (`Bearer` is
/// accepted too). `None` when no header was sent.
fn credential(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;

    ["Token ", "Bearer "]
        .iter()
        .find_map(|scheme| value.strip_prefix(scheme))
        .map(|token| Some(token.trim()))
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))
}

fn resolve_caller(parts: &Parts, state: &AppState) -> Result<Caller, AppError> {
    let Some(token) = credential(parts)? else {
        return Ok(Caller::Anonymous);
    };

    let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Authentication(e.to_string()))?;
    Ok(Caller::User(claims.user_id))
}

/// Extractor for endpoints that require a valid token.
///
/// Rejects with 401 before the handler runs, so no entity is looked up
/// for anonymous requests.
pub struct AuthenticatedUser(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match resolve_caller(parts, state)? {
            Caller::Anonymous => Err(AppError::Authentication(
                "Authentication credentials were not provided".to_string(),
            )),
            caller => Ok(AuthenticatedUser(caller)),
        }
    }
}

/// Extractor for endpoints open to anonymous callers. A missing or invalid
/// token yields [`Caller::Anonymous`].
pub struct MaybeUser(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let caller = resolve_caller(parts, state).unwrap_or(Caller::Anonymous);
        Ok(MaybeUser(caller))
    }
}

/// JSON body whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Payload<T>(pub T);

/// Path parameters whose rejections use the API error format
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathId<T>(pub T);
