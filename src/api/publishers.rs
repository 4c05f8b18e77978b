//! Publisher endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::publisher::{CreatePublisher, Publisher, PublisherQuery, UpdatePublisher},
    AppState,
};

use super::{AuthenticatedUser, MaybeUser, Payload, PathId};

/// List publishers, optionally searching on title
#[utoipa::path(
    get,
    path = "/publishers/",
    tag = "publishers",
    params(PublisherQuery),
    responses((status = 200, description = "Publishers", body = Vec<Publisher>))
)]
pub async fn list_publishers(
    State(state): State<AppState>,
    Query(query): Query<PublisherQuery>,
) -> AppResult<Json<Vec<Publisher>>> {
    Ok(Json(state.services.catalog.list_publishers(&query).await?))
}

#[utoipa::path(
    post,
    path = "/publishers/",
    tag = "publishers",
    security(("token_auth" = [])),
    request_body = CreatePublisher,
    responses(
        (status = 201, description = "Publisher created", body = Publisher),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Payload(publisher): Payload<CreatePublisher>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    let created = state.services.catalog.create_publisher(caller, publisher).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/publishers/{id}/",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher ID")),
    responses(
        (status = 200, description = "Publisher", body = Publisher),
        (status = 404, description = "Publisher not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_publisher(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    PathId(id): PathId<i64>,
) -> AppResult<Json<Publisher>> {
    Ok(Json(state.services.catalog.get_publisher(caller, id).await?))
}

#[utoipa::path(
    patch,
    path = "/publishers/{id}/",
    tag = "publishers",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Publisher ID")),
    request_body = UpdatePublisher,
    responses(
        (status = 200, description = "Publisher updated", body = Publisher),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
    Payload(publisher): Payload<UpdatePublisher>,
) -> AppResult<Json<Publisher>> {
    Ok(Json(state.services.catalog.update_publisher(caller, id, publisher).await?))
}

#[utoipa::path(
    delete,
    path = "/publishers/{id}/",
    tag = "publishers",
    security(("token_auth" = [])),
    params(("id" = i64, Path, description = "Publisher ID")),
    responses(
        (status = 204, description = "Publisher deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_publisher(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathId(id): PathId<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_publisher(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
