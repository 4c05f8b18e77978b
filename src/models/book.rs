//! Book model and its list/detail/record representations

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::{
    author::{Author, AuthorRow, AuthorShort},
    publisher::Publisher,
    tag::Tag,
    user::{UserMinimal, UserRef},
};
use crate::media::{MediaUrls, Thumbnail};

static ISBN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{9}[\dX]|\d{13})$").expect("valid regex"));

/// Strip separators from a submitted ISBN
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    if isbn.is_empty() || ISBN.is_match(&normalize_isbn(isbn)) {
        Ok(())
    } else {
        let mut err = ValidationError::new("isbn");
        err.message = Some("ISBN must have 10 or 13 digits".into());
        Err(err)
    }
}

/// Row from `books` with owner and publisher columns joined in
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    pub publisher_id: Option<i64>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub contents: Option<String>,
    pub cover_image: Option<String>,
    pub file: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub user_username: Option<String>,
    pub user_profile_image: Option<String>,
    pub publisher_title: Option<String>,
    pub publisher_user_id: Option<i64>,
}

impl BookRow {
    pub fn user_ref(&self) -> Option<UserRef> {
        Some(UserRef {
            id: self.user_id?,
            username: self.user_username.clone()?,
            profile_image: self.user_profile_image.clone(),
        })
    }

    pub fn publisher(&self) -> Option<Publisher> {
        Some(Publisher {
            id: self.publisher_id?,
            title: self.publisher_title.clone()?,
            user_id: self.publisher_user_id,
        })
    }
}

/// A book row with its many-to-many relations loaded
#[derive(Debug, Clone)]
pub struct BookBundle {
    pub row: BookRow,
    pub authors: Vec<AuthorRow>,
    pub tags: Vec<Tag>,
}

struct Cover {
    cover_image: Option<String>,
    small: Option<String>,
    medium: Option<String>,
    large: Option<String>,
}

impl Cover {
    fn render(stored: Option<&str>, media: &MediaUrls) -> Self {
        Self {
            cover_image: media.url(stored),
            small: media.thumbnail(stored, Thumbnail::Small),
            medium: media.thumbnail(stored, Thumbnail::Medium),
            large: media.thumbnail(stored, Thumbnail::Large),
        }
    }
}

/// Book in paginated listings and inside list summaries
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookList {
    pub id: i64,
    pub user: Option<UserMinimal>,
    pub authors: Vec<AuthorShort>,
    pub title: String,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    pub publisher: Option<Publisher>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub contents: Option<String>,
    pub tags: Vec<Tag>,
    pub cover_image: Option<String>,
    pub cover_thumbnail_small: Option<String>,
    pub cover_thumbnail_medium: Option<String>,
    pub cover_thumbnail_large: Option<String>,
    pub file: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl BookList {
    pub fn render(book: &BookBundle, media: &MediaUrls) -> Self {
        let row = &book.row;
        let cover = Cover::render(row.cover_image.as_deref(), media);
        Self {
            id: row.id,
            user: row.user_ref().map(|u| UserMinimal::render(&u, media)),
            authors: book.authors.iter().map(AuthorShort::from).collect(),
            title: row.title.clone(),
            year: row.year,
            pages: row.pages,
            publisher: row.publisher(),
            isbn: row.isbn.clone(),
            description: row.description.clone(),
            contents: row.contents.clone(),
            tags: book.tags.clone(),
            cover_image: cover.cover_image,
            cover_thumbnail_small: cover.small,
            cover_thumbnail_medium: cover.medium,
            cover_thumbnail_large: cover.large,
            file: media.url(row.file.as_deref()),
            created: row.created,
            updated: row.updated,
        }
    }
}

/// Book with fully expanded authors
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub id: i64,
    pub user: Option<UserMinimal>,
    pub authors: Vec<Author>,
    pub title: String,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    pub publisher: Option<Publisher>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub contents: Option<String>,
    pub tags: Vec<Tag>,
    pub cover_image: Option<String>,
    pub cover_thumbnail_small: Option<String>,
    pub cover_thumbnail_medium: Option<String>,
    pub cover_thumbnail_large: Option<String>,
    pub file: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl BookDetail {
    pub fn render(book: &BookBundle, media: &MediaUrls) -> Self {
        let row = &book.row;
        let cover = Cover::render(row.cover_image.as_deref(), media);
        Self {
            id: row.id,
            user: row.user_ref().map(|u| UserMinimal::render(&u, media)),
            authors: book.authors.iter().map(|a| Author::render(a, media)).collect(),
            title: row.title.clone(),
            year: row.year,
            pages: row.pages,
            publisher: row.publisher(),
            isbn: row.isbn.clone(),
            description: row.description.clone(),
            contents: row.contents.clone(),
            tags: book.tags.clone(),
            cover_image: cover.cover_image,
            cover_thumbnail_small: cover.small,
            cover_thumbnail_medium: cover.medium,
            cover_thumbnail_large: cover.large,
            file: media.url(row.file.as_deref()),
            created: row.created,
            updated: row.updated,
        }
    }
}

/// Stored book as returned by create/update: relations as ids
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookRecord {
    pub id: i64,
    pub user: Option<i64>,
    pub authors: Vec<i64>,
    pub title: String,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    pub publisher: Option<i64>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub contents: Option<String>,
    pub tags: Vec<i64>,
    pub cover_image: Option<String>,
    pub file: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl BookRecord {
    pub fn render(book: &BookBundle, media: &MediaUrls) -> Self {
        let row = &book.row;
        Self {
            id: row.id,
            user: row.user_id,
            authors: book.authors.iter().map(|a| a.id).collect(),
            title: row.title.clone(),
            year: row.year,
            pages: row.pages,
            publisher: row.publisher_id,
            isbn: row.isbn.clone(),
            description: row.description.clone(),
            contents: row.contents.clone(),
            tags: book.tags.iter().map(|t| t.id).collect(),
            cover_image: media.url(row.cover_image.as_deref()),
            file: media.url(row.file.as_deref()),
            created: row.created,
            updated: row.updated,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(
        length(min = 1, max = 512, message = "Title must be 1 to 512 characters"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: String,
    #[validate(length(min = 1, message = "At least one author is required"))]
    pub authors: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<i64>,
    pub publisher: Option<i64>,
    #[validate(range(min = 0))]
    pub year: Option<i32>,
    #[validate(range(min = 0))]
    pub pages: Option<i32>,
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub contents: Option<String>,
    /// Storage path of an already uploaded cover
    pub cover_image: Option<String>,
    /// Storage path of an already uploaded book file
    pub file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(
        length(min = 1, max = 512, message = "Title must be 1 to 512 characters"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "At least one author is required"))]
    pub authors: Option<Vec<i64>>,
    pub tags: Option<Vec<i64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i64>)]
    pub publisher: Option<Option<i64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 0))]
    pub year: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 0))]
    pub pages: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub contents: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub cover_image: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub file: Option<Option<String>>,
}

/// Book search parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Substring matched against title, author last name, description and contents
    pub query: Option<String>,
    /// Page number, starting at 1
    pub page: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> BookBundle {
        let now = Utc::now();
        BookBundle {
            row: BookRow {
                id: 5,
                user_id: Some(2),
                title: "The Dispossessed".to_string(),
                year: Some(1974),
                pages: Some(387),
                publisher_id: Some(8),
                isbn: Some("9780061054884".to_string()),
                description: None,
                contents: None,
                cover_image: Some("images/covers/dispossessed.jpg".to_string()),
                file: None,
                created: now,
                updated: now,
                user_username: Some("shevek".to_string()),
                user_profile_image: None,
                publisher_title: Some("Harper".to_string()),
                publisher_user_id: None,
            },
            authors: vec![AuthorRow {
                id: 11,
                user_id: None,
                first_name: Some("Ursula".to_string()),
                middle_name: Some("K.".to_string()),
                last_name: "Le Guin".to_string(),
                description: None,
                portrait: None,
                user_username: None,
                user_profile_image: None,
            }],
            tags: vec![Tag { id: 3, title: "sf".to_string(), user_id: Some(2) }],
        }
    }

    #[test]
    fn test_isbn_validation() {
        assert!(validate_isbn("978-0-06-105488-4").is_ok());
        assert!(validate_isbn("0-306-40615-X").is_ok());
        assert!(validate_isbn("").is_ok());
        assert!(validate_isbn("12345").is_err());
        assert_eq!(normalize_isbn("0-306-40615-x"), "030640615X");
    }

    #[test]
    fn test_create_requires_an_author() {
        let create: CreateBook =
            serde_json::from_str(r#"{"title": "Test book", "authors": []}"#).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("authors"));
    }

    #[test]
    fn test_list_and_detail_rendering() {
        let media = MediaUrls::default();
        let book = bundle();

        let list = BookList::render(&book, &media);
        assert_eq!(list.user.as_ref().map(|u| u.id), Some(2));
        assert_eq!(list.authors[0].full_name, "Le Guin Ursula K.");
        assert_eq!(list.publisher.as_ref().map(|p| p.title.as_str()), Some("Harper"));
        assert_eq!(
            list.cover_thumbnail_large.as_deref(),
            Some("/media/CACHE/thumbnails/large/images/covers/dispossessed.jpg")
        );
        assert_eq!(list.file, None);

        let detail = BookDetail::render(&book, &media);
        assert_eq!(detail.authors[0].id, 11);

        let record = BookRecord::render(&book, &media);
        assert_eq!(record.user, Some(2));
        assert_eq!(record.authors, vec![11]);
        assert_eq!(record.tags, vec![3]);
        assert_eq!(record.publisher, Some(8));
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let create: CreateBook =
            serde_json::from_str(r#"{"title": "  ", "authors": [1]}"#).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let update: UpdateBook = serde_json::from_str(r#"{"title": " "}"#).unwrap();
        assert!(update.validate().is_err());

        let update: UpdateBook = serde_json::from_str(r#"{"title": " Solaris "}"#).unwrap();
        assert!(update.validate().is_ok());
    }
}
