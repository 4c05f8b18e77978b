//! List item endpoints. Positions are dense and zero-based within a list.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::list::{CreateListItem, ListItemDetail, ListItemRecord, MoveListItem, UpdateListItem},
    AppState,
};

use super::{AuthenticatedUser, MaybeUser, Payload, PathId};

/// Add a book to a list
///
/// Appends unless `position` is given, in which case the item is inserted
/// there and later items shift down.
#[utoipa::path(
    post,
    path = "/list_items/create/",
    tag = "list_items",
    security(("token_auth" = [])),
    request_body = CreateListItem,
    responses(
        (status = 201, description = "Item added", body = ListItemRecord),
        (status = 400, description = "Unknown book or list, or book already in list", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the list owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_list_item(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Payload(item): Payload<CreateListItem>,
) -> AppResult<(StatusCode, Json<ListItemRecord>)> {
    let created = state.services.lists.add_item(caller, item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/list_items/{id}/",
    tag = "list_items",
    params(("id" = i64, Path, description = "List item ID")),
    responses(
        (status = 200, description = "Item with its book", body = ListItemDetail),
        (status = 403, description = "Item of a private list", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_list_item(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    PathId(id): PathId<i64>,
) -> AppResult<Json<ListItemDetail>> {
    Ok(Json(state.services.lists.get_item(caller, id).await?))
}

#[utoipa::path(
    patch,
    path = "/list_items/{id}/",
    tag = "list_items",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "List item ID")),
    request_body = UpdateListItem,
    responses(
        (status = 200, description = "Item updated", body = ListItemRecord),
        (status = 403, description = "Not the list owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_list_item(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(item): Payload<UpdateListItem>,
) -> AppResult<Json<ListItemRecord>> {
    Ok(Json(state.services.lists.update_item(caller, id, item).await?))
}

/// Remove an item; the items after it close the gap
#[utoipa::path(
    delete,
    path = "/list_items/{id}/",
    tag = "list_items",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "List item ID")),
    responses(
        (status = 204, description = "Item removed"),
        (status = 403, description = "Not the list owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_list_item(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<StatusCode> {
    state.services.lists.delete_item(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move an item one step or to either end of its list
#[utoipa::path(
    post,
    path = "/list_items/{id}/move/",
    tag = "list_items",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "List item ID")),
    request_body = MoveListItem,
    responses(
        (status = 200, description = "All items of the list in their new order", body = Vec<ListItemRecord>),
        (status = 400, description = "Unknown direction", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the list owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn move_list_item(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(request): Payload<MoveListItem>,
) -> AppResult<Json<Vec<ListItemRecord>>> {
    let items = state.services.lists.move_item(caller, id, request.direction).await?;
    Ok(Json(items))
}
