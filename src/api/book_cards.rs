//! Book card endpoints (reading status, favorites)

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book_card::{BookCard, BookCardQuery, CreateBookCard, UpdateBookCard},
    AppState,
};

use super::{AuthenticatedUser, Payload, PathId};

#[utoipa::path(
    get,
    path = "/book_cards/",
    tag = "book_cards",
    security(("token_auth" = [])),
    params(BookCardQuery),
    responses(
        (status = 200, description = "Caller's book cards", body = Vec<BookCard>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_book_cards(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(query): Query<BookCardQuery>,
) -> AppResult<Json<Vec<BookCard>>> {
    Ok(Json(state.services.book_cards.list(caller, &query).await?))
}

#[utoipa::path(
    post,
    path = "/book_cards/create/",
    tag = "book_cards",
    security(("token_auth" = [])),
    request_body = CreateBookCard,
    responses(
        (status = 201, description = "Book card created", body = BookCard),
        (status = 400, description = "Unknown book", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book_card(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Payload(card): Payload<CreateBookCard>,
) -> AppResult<(StatusCode, Json<BookCard>)> {
    let created = state.services.book_cards.create(caller, card).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/book_cards/{id}/",
    tag = "book_cards",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Book card ID")),
    responses(
        (status = 200, description = "Book card", body = BookCard),
        (status = 403, description = "Someone else's card", body = crate::error::ErrorResponse),
        (status = 404, description = "Book card not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book_card(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<Json<BookCard>> {
    Ok(Json(state.services.book_cards.get(caller, id).await?))
}

#[utoipa::path(
    patch,
    path = "/book_cards/{id}/",
    tag = "book_cards",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Book card ID")),
    request_body = UpdateBookCard,
    responses(
        (status = 200, description = "Book card updated", body = BookCard),
        (status = 403, description = "Someone else's card", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book_card(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(card): Payload<UpdateBookCard>,
) -> AppResult<Json<BookCard>> {
    Ok(Json(state.services.book_cards.update(caller, id, card).await?))
}

#[utoipa::path(
    delete,
    path = "/book_cards/{id}/",
    tag = "book_cards",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Book card ID")),
    responses(
        (status = 204, description = "Book card deleted"),
        (status = 403, description = "Someone else's card", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book_card(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<StatusCode> {
    state.services.book_cards.delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
