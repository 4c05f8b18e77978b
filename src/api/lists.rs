//! Book list endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::list::{CreateList, ListDetail, ListQuery, ListSummary, UpdateList},
    AppState,
};

use super::{AuthenticatedUser, MaybeUser, Payload, PathId};

/// Public lists plus the caller's own
///
/// With `only_own_lists=true` only the caller's lists are returned, which
/// requires a token.
#[utoipa::path(
    get,
    path = "/lists/",
    tag = "lists",
    params(ListQuery),
    responses(
        (status = 200, description = "Visible lists with their items", body = Vec<ListSummary>),
        (status = 401, description = "only_own_lists without a token", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_lists(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ListSummary>>> {
    Ok(Json(state.services.lists.list(caller, &query).await?))
}

#[utoipa::path(
    post,
    path = "/lists/create/",
    tag = "lists",
    security(("token_auth" = [])),
    request_body = CreateList,
    responses(
        (status = 201, description = "List created", body = ListDetail),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_list(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Payload(list): Payload<CreateList>,
) -> AppResult<(StatusCode, Json<ListDetail>)> {
    let created = state.services.lists.create(caller, list).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/lists/{id}/",
    tag = "lists",
    params(("id" = i64, Path, description = "List ID")),
    responses(
        (status = 200, description = "List with its ordered items", body = ListDetail),
        (status = 403, description = "Private list", body = crate::error::ErrorResponse),
        (status = 404, description = "List not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_list(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    PathId(id): PathId<i64>,
) -> AppResult<Json<ListDetail>> {
    Ok(Json(state.services.lists.get(caller, id).await?))
}

#[utoipa::path(
    patch,
    path = "/lists/{id}/",
    tag = "lists",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "List ID")),
    request_body = UpdateList,
    responses(
        (status = 200, description = "List updated", body = ListDetail),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_list(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(list): Payload<UpdateList>,
) -> AppResult<Json<ListDetail>> {
    Ok(Json(state.services.lists.update(caller, id, list).await?))
}

#[utoipa::path(
    delete,
    path = "/lists/{id}/",
    tag = "lists",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "List ID")),
    responses(
        (status = 204, description = "List and its items deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_list(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<StatusCode> {
    state.services.lists.delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
