//! Publisher model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i64,
    pub title: String,
    #[serde(rename = "user")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePublisher {
    #[validate(
        length(min = 1, max = 128, message = "Title must be 1 to 128 characters"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePublisher {
    #[validate(
        length(min = 1, max = 128, message = "Title must be 1 to 128 characters"),
        custom(function = "crate::models::not_blank")
    )]
    pub title: Option<String>,
}

/// `?query=` search on title
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PublisherQuery {
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_is_rejected() {
        let create: CreatePublisher = serde_json::from_str(r#"{"title": "  "}"#).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let update: UpdatePublisher = serde_json::from_str(r#"{"title": "\t"}"#).unwrap();
        assert!(update.validate().is_err());

        let create: CreatePublisher = serde_json::from_str(r#"{"title": "Harper"}"#).unwrap();
        assert!(create.validate().is_ok());
    }
}
