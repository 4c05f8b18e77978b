//! Tag endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::tag::{CreateTag, Tag, TagQuery, UpdateTag},
    AppState,
};

use super::{AuthenticatedUser, MaybeUser, Payload, PathId};

#[utoipa::path(
    get,
    path = "/tags/",
    tag = "tags",
    params(TagQuery),
    responses((status = 200, description = "Tags ordered by title", body = Vec<Tag>))
)]
pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<TagQuery>,
) -> AppResult<Json<Vec<Tag>>> {
    Ok(Json(state.services.catalog.list_tags(&query).await?))
}

#[utoipa::path(
    post,
    path = "/tags/",
    tag = "tags",
    security(("token_auth" = [])),
    request_body = CreateTag,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_tag(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Payload(tag): Payload<CreateTag>,
) -> AppResult<(StatusCode, Json<Tag>)> {
    let created = state.services.catalog.create_tag(caller, tag).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/tags/{id}/",
    tag = "tags",
    params(("id" = i64, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag", body = Tag),
        (status = 404, description = "Tag not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_tag(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    PathId(id): PathId<i64>,
) -> AppResult<Json<Tag>> {
    Ok(Json(state.services.catalog.get_tag(caller, id).await?))
}

#[utoipa::path(
    patch,
    path = "/tags/{id}/",
    tag = "tags",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Tag ID")),
    request_body = UpdateTag,
    responses(
        (status = 200, description = "Tag updated", body = Tag),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_tag(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(tag): Payload<UpdateTag>,
) -> AppResult<Json<Tag>> {
    Ok(Json(state.services.catalog.update_tag(caller, id, tag).await?))
}

#[utoipa::path(
    delete,
    path = "/tags/{id}/",
    tag = "tags",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_tag(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
