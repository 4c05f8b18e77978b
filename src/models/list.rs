//! Curated book lists and their ordered items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    book::{BookBundle, BookDetail, BookList},
    user::{UserMinimal, UserRef},
};
use crate::{
    access::Resource,
    media::MediaUrls,
    ordering::{Direction, Slot},
};

/// Row from `lists` with the owner's public columns joined in
#[derive(Debug, Clone, FromRow)]
pub struct ListRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub user_username: Option<String>,
    pub user_profile_image: Option<String>,
}

impl ListRow {
    pub fn user_ref(&self) -> Option<UserRef> {
        Some(UserRef {
            id: self.user_id?,
            username: self.user_username.clone()?,
            profile_image: self.user_profile_image.clone(),
        })
    }

    pub fn resource(&self) -> Resource {
        Resource::List {
            owner: self.user_id,
            is_public: self.is_public,
        }
    }

    /// Access rule subject for the items of this list
    pub fn item_resource(&self) -> Resource {
        Resource::ListItem {
            list_owner: self.user_id,
            list_is_public: self.is_public,
        }
    }
}

/// Row from `list_items`
#[derive(Debug, Clone, FromRow)]
pub struct ListItemRow {
    pub id: i64,
    pub list_id: i64,
    pub book_id: i64,
    pub order: i32,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<&ListItemRow> for Slot {
    fn from(row: &ListItemRow) -> Self {
        Slot {
            item_id: row.id,
            book_id: row.book_id,
            order: row.order,
        }
    }
}

/// Stored list item as returned by create/update/move
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListItemRecord {
    pub id: i64,
    pub list: i64,
    pub book: i64,
    pub order: i32,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<&ListItemRow> for ListItemRecord {
    fn from(row: &ListItemRow) -> Self {
        Self {
            id: row.id,
            list: row.list_id,
            book: row.book_id,
            order: row.order,
            description: row.description.clone(),
            created: row.created,
            updated: row.updated,
        }
    }
}

/// List item inside a list listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListItemSummary {
    pub id: i64,
    pub book: BookList,
    pub order: i32,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// List item with the fully expanded book
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListItemDetail {
    pub id: i64,
    pub list: i64,
    pub book: BookDetail,
    pub order: i32,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ListItemDetail {
    pub fn render(row: &ListItemRow, book: &BookBundle, media: &MediaUrls) -> Self {
        Self {
            id: row.id,
            list: row.list_id,
            book: BookDetail::render(book, media),
            order: row.order,
            description: row.description.clone(),
            created: row.created,
            updated: row.updated,
        }
    }
}

/// List in the `/lists/` collection
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListSummary {
    pub id: i64,
    pub user: Option<UserMinimal>,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub items: Vec<ListItemSummary>,
}

impl ListSummary {
    /// `items` must be in list order, each paired with its loaded book
    pub fn render(list: &ListRow, items: &[(&ListItemRow, &BookBundle)], media: &MediaUrls) -> Self {
        Self {
            id: list.id,
            user: list.user_ref().map(|u| UserMinimal::render(&u, media)),
            title: list.title.clone(),
            description: list.description.clone(),
            is_public: list.is_public,
            created: list.created,
            updated: list.updated,
            items: items
                .iter()
                .map(|(item, book)| ListItemSummary {
                    id: item.id,
                    book: BookList::render(book, media),
                    order: item.order,
                    description: item.description.clone(),
                    created: item.created,
                    updated: item.updated,
                })
                .collect(),
        }
    }
}

/// Single list with fully expanded items
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListDetail {
    pub id: i64,
    pub user: Option<UserMinimal>,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub items: Vec<ListItemDetail>,
}

impl ListDetail {
    pub fn render(list: &ListRow, items: &[(&ListItemRow, &BookBundle)], media: &MediaUrls) -> Self {
        Self {
            id: list.id,
            user: list.user_ref().map(|u| UserMinimal::render(&u, media)),
            title: list.title.clone(),
            description: list.description.clone(),
            is_public: list.is_public,
            created: list.created,
            updated: list.updated,
            items: items
                .iter()
                .map(|(item, book)| ListItemDetail::render(item, book, media))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateList {
    #[validate(
        length(min = 1, max = 512, message = "Title must be 1 to 512 characters"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateList {
    #[validate(
        length(min = 1, max = 512, message = "Title must be 1 to 512 characters"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
}

/// `/lists/` filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListQuery {
    /// Only lists containing this book
    pub book_id: Option<i64>,
    /// Only the caller's own lists (requires authentication)
    pub only_own_lists: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateListItem {
    pub book: i64,
    pub list: i64,
    pub description: Option<String>,
    /// Insert at this position instead of appending
    #[validate(range(min = 0))]
    pub position: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateListItem {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveListItem {
    pub direction: Direction,
}
