//! Author model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::user::{UserMinimal, UserRef};
use crate::media::{MediaUrls, Thumbnail};

/// Row from `authors`, with the curator's public columns joined in
#[derive(Debug, Clone, FromRow)]
pub struct AuthorRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub description: Option<String>,
    pub portrait: Option<String>,
    pub user_username: Option<String>,
    pub user_profile_image: Option<String>,
}

impl AuthorRow {
    /// Last name, then first name, then middle name; empty parts skipped.
    pub fn full_name(&self) -> String {
        full_name(&self.last_name, self.first_name.as_deref(), self.middle_name.as_deref())
    }

    pub fn user_ref(&self) -> Option<UserRef> {
        Some(UserRef {
            id: self.user_id?,
            username: self.user_username.clone()?,
            profile_image: self.user_profile_image.clone(),
        })
    }
}

pub fn full_name(last_name: &str, first_name: Option<&str>, middle_name: Option<&str>) -> String {
    [Some(last_name), first_name, middle_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Author as shown on its own and inside book details
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Author {
    pub id: i64,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub portrait: Option<String>,
    pub portrait_thumbnail: Option<String>,
    pub user: Option<UserMinimal>,
}

impl Author {
    pub fn render(row: &AuthorRow, media: &MediaUrls) -> Self {
        let portrait = row.portrait.as_deref();
        Self {
            id: row.id,
            first_name: row.first_name.clone(),
            middle_name: row.middle_name.clone(),
            last_name: row.last_name.clone(),
            full_name: row.full_name(),
            description: row.description.clone(),
            portrait: media.url(portrait),
            portrait_thumbnail: media.thumbnail(portrait, Thumbnail::Portrait),
            user: row.user_ref().map(|u| UserMinimal::render(&u, media)),
        }
    }
}

/// Author inside book list entries
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorShort {
    pub id: i64,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub description: Option<String>,
}

impl From<&AuthorRow> for AuthorShort {
    fn from(row: &AuthorRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name.clone(),
            middle_name: row.middle_name.clone(),
            last_name: row.last_name.clone(),
            full_name: row.full_name(),
            description: row.description.clone(),
        }
    }
}

/// Stored author as returned by create/update
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorRecord {
    pub id: i64,
    pub user: Option<i64>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub portrait: Option<String>,
}

impl AuthorRecord {
    pub fn render(row: &AuthorRow, media: &MediaUrls) -> Self {
        Self {
            id: row.id,
            user: row.user_id,
            first_name: row.first_name.clone(),
            middle_name: row.middle_name.clone(),
            last_name: row.last_name.clone(),
            full_name: row.full_name(),
            description: row.description.clone(),
            portrait: media.url(row.portrait.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(max = 32))]
    pub first_name: Option<String>,
    #[validate(length(max = 32))]
    pub middle_name: Option<String>,
    #[validate(
        length(min = 1, max = 32, message = "Last name is required (max 32 characters)"),
        custom(function = "crate::models::not_blank")
    )]
    pub last_name: String,
    pub description: Option<String>,
    /// Storage path of an already uploaded portrait
    pub portrait: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 32))]
    pub first_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 32))]
    pub middle_name: Option<Option<String>>,
    #[validate(
        length(min = 1, max = 32, message = "Last name cannot be empty (max 32 characters)"),
        custom(function = "crate::models::not_blank")
    )]
    pub last_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub portrait: Option<Option<String>>,
}

/// `?query=` search on last name
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AuthorQuery {
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_order() {
        assert_eq!(
            full_name("Ivanov", Some("Ivan"), Some("Ivanovich")),
            "Ivanov Ivan Ivanovich"
        );
        assert_eq!(full_name("Petrov", Some("Petr"), Some("")), "Petrov Petr");
        assert_eq!(full_name("Sidorov", Some(""), None), "Sidorov");
        assert_eq!(full_name("Tolstoy", None, Some("Nikolayevich")), "Tolstoy Nikolayevich");
    }

    #[test]
    fn test_render_without_curator() {
        let row = AuthorRow {
            id: 1,
            user_id: None,
            first_name: Some("Ursula".to_string()),
            middle_name: None,
            last_name: "Le Guin".to_string(),
            description: None,
            portrait: Some("images/portraits/leguin.jpg".to_string()),
            user_username: None,
            user_profile_image: None,
        };
        let author = Author::render(&row, &MediaUrls::default());
        assert_eq!(author.full_name, "Le Guin Ursula");
        assert!(author.user.is_none());
        assert_eq!(
            author.portrait_thumbnail.as_deref(),
            Some("/media/CACHE/thumbnails/portrait/images/portraits/leguin.jpg")
        );
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let update: UpdateAuthor =
            serde_json::from_str(r#"{"first_name": null, "last_name": "Smith"}"#).unwrap();
        assert_eq!(update.first_name, Some(None));
        assert_eq!(update.middle_name, None);
        assert_eq!(update.last_name.as_deref(), Some("Smith"));
    }

    #[test]
    fn test_create_ignores_submitted_owner() {
        let create: CreateAuthor =
            serde_json::from_str(r#"{"last_name": "Ivanov", "user": 999}"#).unwrap();
        assert_eq!(create.last_name, "Ivanov");
        assert!(create.validate().is_ok());
    }

    #[test]
    fn test_blank_last_name_is_rejected() {
        let create: CreateAuthor = serde_json::from_str(r#"{"last_name": "   "}"#).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("last_name"));

        let update: UpdateAuthor = serde_json::from_str(r#"{"last_name": "  "}"#).unwrap();
        assert!(update.validate().is_err());

        let update: UpdateAuthor = serde_json::from_str(r#"{"first_name": null}"#).unwrap();
        assert!(update.validate().is_ok());
    }
}
