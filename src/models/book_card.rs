//! Book card: a user's reading status for one book

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookCard {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: i64,
    #[serde(rename = "book")]
    pub book_id: i64,
    pub is_favorite: bool,
    pub want_to_read: bool,
    pub is_reading: bool,
    pub is_read: bool,
    pub read_on: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookCard {
    pub book: i64,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub want_to_read: bool,
    #[serde(default)]
    pub is_reading: bool,
    #[serde(default)]
    pub is_read: bool,
    pub read_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBookCard {
    pub is_favorite: Option<bool>,
    pub want_to_read: Option<bool>,
    pub is_reading: Option<bool>,
    pub is_read: Option<bool>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub read_on: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookCardQuery {
    pub book_id: Option<i64>,
}
