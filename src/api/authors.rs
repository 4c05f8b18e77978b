//! Author endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::author::{Author, AuthorQuery, AuthorRecord, CreateAuthor, UpdateAuthor},
    AppState,
};

use super::{AuthenticatedUser, MaybeUser, Payload, PathId};

/// List authors, optionally searching on last name
#[utoipa::path(
    get,
    path = "/authors/",
    tag = "authors",
    params(AuthorQuery),
    responses(
        (status = 200, description = "Authors ordered by last name", body = Vec<Author>)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.catalog.list_authors(&query).await?;
    Ok(Json(authors))
}

#[utoipa::path(
    get,
    path = "/authors/{id}/",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    PathId(id): PathId<i64>,
) -> AppResult<Json<Author>> {
    let author = state.services.catalog.get_author(caller, id).await?;
    Ok(Json(author))
}

#[utoipa::path(
    post,
    path = "/authors/create/",
    tag = "authors",
    security(("token_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = AuthorRecord),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Payload(author): Payload<CreateAuthor>,
) -> AppResult<(StatusCode, Json<AuthorRecord>)> {
    let created = state.services.catalog.create_author(caller, author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch,
    path = "/authors/{id}/",
    tag = "authors",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = AuthorRecord),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(author): Payload<UpdateAuthor>,
) -> AppResult<Json<AuthorRecord>> {
    let updated = state.services.catalog.update_author(caller, id, author).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/authors/{id}/",
    tag = "authors",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_author(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
