//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A user's private annotation on a book
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Note {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: i64,
    #[serde(rename = "book")]
    pub book_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNote {
    pub book: i64,
    #[validate(
        length(min = 1, message = "Note text cannot be empty"),
        custom(function = "crate::models::not_blank")
    )]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateNote {
    #[validate(
        length(min = 1, message = "Note text cannot be empty"),
        custom(function = "crate::models::not_blank")
    )]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct NoteQuery {
    pub book_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_rejected() {
        let create: CreateNote = serde_json::from_str(r#"{"book": 1, "text": " \n "}"#).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("text"));

        let update: UpdateNote = serde_json::from_str(r#"{"text": "  "}"#).unwrap();
        assert!(update.validate().is_err());

        let update: UpdateNote = serde_json::from_str(r#"{}"#).unwrap();
        assert!(update.validate().is_ok());
    }
}
