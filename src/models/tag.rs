//! Tag model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Tag assigned to books, curated per user
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Tag {
    pub id: i64,
    pub title: String,
    #[serde(rename = "user")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTag {
    #[validate(
        length(min = 1, max = 32, message = "Title must be 1 to 32 characters"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTag {
    #[validate(
        length(min = 1, max = 32, message = "Title must be 1 to 32 characters"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TagQuery {
    pub query: Option<String>,
}
