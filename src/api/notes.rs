//! Private notes on books. Every endpoint requires a token.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::note::{CreateNote, Note, NoteQuery, UpdateNote},
    AppState,
};

use super::{AuthenticatedUser, Payload, PathId};

/// The caller's notes, optionally for a single book
#[utoipa::path(
    get,
    path = "/notes/",
    tag = "notes",
    security(("token_auth" = [])),
    params(NoteQuery),
    responses(
        (status = 200, description = "Caller's notes", body = Vec<Note>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_notes(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(query): Query<NoteQuery>,
) -> AppResult<Json<Vec<Note>>> {
    Ok(Json(state.services.notes.list(caller, &query).await?))
}

#[utoipa::path(
    post,
    path = "/notes/create/",
    tag = "notes",
    security(("token_auth" = [])),
    request_body = CreateNote,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Invalid input or unknown book", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_note(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Payload(note): Payload<CreateNote>,
) -> AppResult<(StatusCode, Json<Note>)> {
    let created = state.services.notes.create(caller, note).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/notes/{id}/",
    tag = "notes",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note", body = Note),
        (status = 403, description = "Someone else's note", body = crate::error::ErrorResponse),
        (status = 404, description = "Note not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_note(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<Json<Note>> {
    Ok(Json(state.services.notes.get(caller, id).await?))
}

#[utoipa::path(
    patch,
    path = "/notes/{id}/",
    tag = "notes",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Note ID")),
    request_body = UpdateNote,
    responses(
        (status = 200, description = "Note updated", body = Note),
        (status = 403, description = "Someone else's note", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_note(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(note): Payload<UpdateNote>,
) -> AppResult<Json<Note>> {
    Ok(Json(state.services.notes.update(caller, id, note).await?))
}

#[utoipa::path(
    delete,
    path = "/notes/{id}/",
    tag = "notes",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Note ID")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 403, description = "Someone else's note", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_note(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<StatusCode> {
    state.services.notes.delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
