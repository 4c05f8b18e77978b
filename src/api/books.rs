//! Book endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{BookDetail, BookList, BookQuery, BookRecord, CreateBook, UpdateBook},
        pagination::Paginated,
    },
    AppState,
};

use super::{AuthenticatedUser, MaybeUser, Payload, PathId};

/// Search books with pagination
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "One page of books", body = crate::models::pagination::PaginatedBooks),
        (status = 404, description = "Invalid page", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Paginated<BookList>>> {
    let page = state.services.catalog.search_books(&query).await?;
    Ok(Json(page))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}/",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    PathId(id): PathId<i64>,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.catalog.get_book(caller, id).await?;
    Ok(Json(book))
}

/// Create a book owned by the caller
#[utoipa::path(
    post,
    path = "/books/create/",
    tag = "books",
    security(("token_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookRecord),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Payload(book): Payload<CreateBook>,
) -> AppResult<(StatusCode, Json<BookRecord>)> {
    let created = state.services.catalog.create_book(caller, book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update a book
#[utoipa::path(
    patch,
    path = "/books/{id}/",
    tag = "books",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookRecord),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(book): Payload<UpdateBook>,
) -> AppResult<Json<BookRecord>> {
    let updated = state.services.catalog.update_book(caller, id, book).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}/",
    tag = "books",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
