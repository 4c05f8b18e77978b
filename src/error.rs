//! Error types for the Bookshelf server

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    PermissionDenied = 3,
    DbFailure = 4,
    NoSuchEntity = 5,
    BadValue = 6,
    OrderingConflict = 7,
}

/// Field name -> messages, the shape clients get for payload errors
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid fields: {0:?}")]
    InvalidFields(FieldErrors),

    #[error("Integrity conflict: {0}")]
    IntegrityConflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-field payload error
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        AppError::InvalidFields(fields)
    }

    /// A referenced object that does not exist, reported against the payload field
    pub fn missing_reference(field: &str, id: i64) -> Self {
        AppError::field(field, format!("Invalid pk \"{}\" - object does not exist.", id))
    }
}

/// Constraint names from the schema that carry domain meaning
const LIST_ORDER_CONSTRAINT: &str = "list_items_list_order_key";
const LIST_BOOK_CONSTRAINT: &str = "list_items_list_book_key";
const BOOK_CARD_CONSTRAINT: &str = "book_cards_user_book_key";
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Map a database error onto a domain error by SQLSTATE and constraint name.
///
/// Returns `None` for anything without domain meaning; those stay
/// `AppError::Database`.
fn classify_db_error(
    code: Option<&str>,
    constraint: Option<&str>,
    message: &str,
) -> Option<AppError> {
    match (code, constraint) {
        // serialization_failure, deadlock_detected
        (Some("40001"), _) | (Some("40P01"), _) => {
            Some(AppError::IntegrityConflict(message.to_string()))
        }
        (Some("23505"), Some(LIST_ORDER_CONSTRAINT)) => Some(AppError::IntegrityConflict(
            format!("duplicate position: {}", message),
        )),
        (Some("23505"), Some(LIST_BOOK_CONSTRAINT)) => {
            Some(AppError::field("book", "This book is already in the list"))
        }
        (Some("23505"), Some(BOOK_CARD_CONSTRAINT)) => {
            Some(AppError::field("book", "A card for this book already exists"))
        }
        (Some("23505"), Some(USERNAME_CONSTRAINT)) => Some(AppError::field(
            "username",
            "A user with that username already exists",
        )),
        _ => None,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let classified = err.as_database_error().and_then(|db_err| {
            classify_db_error(db_err.code().as_deref(), db_err.constraint(), db_err.message())
        });

        classified.unwrap_or(AppError::Database(err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        AppError::InvalidFields(fields)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::PermissionDenied, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchEntity, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone()),
            AppError::InvalidFields(_) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::BadValue,
                "Invalid input".to_string(),
            ),
            AppError::IntegrityConflict(msg) => {
                tracing::warn!("Integrity conflict: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::OrderingConflict,
                    "Concurrent modification, please retry".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let retryable = matches!(self, AppError::IntegrityConflict(_));

        let fields = match self {
            AppError::InvalidFields(fields) => Some(fields),
            _ => None,
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fields,
        });

        let mut response = (status, body).into_response();
        if retryable {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Authentication("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Authorization("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::field("book", "dup").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::IntegrityConflict("x".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_integrity_conflict_is_retryable() {
        let response = AppError::IntegrityConflict("order".into()).into_response();
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "1");
    }

    #[test]
    fn test_field_error_shape() {
        match AppError::field("list", "not yours") {
            AppError::InvalidFields(fields) => {
                assert_eq!(fields["list"], vec!["not yours".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_reference_message() {
        match AppError::missing_reference("list", 77) {
            AppError::InvalidFields(fields) => {
                assert_eq!(
                    fields["list"],
                    vec!["Invalid pk \"77\" - object does not exist.".to_string()]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_retryable_codes() {
        for code in ["40001", "40P01"] {
            match classify_db_error(Some(code), None, "could not serialize access") {
                Some(AppError::IntegrityConflict(msg)) => {
                    assert_eq!(msg, "could not serialize access")
                }
                other => panic!("unexpected {:?} for {}", other, code),
            }
        }
    }

    #[test]
    fn test_classify_unique_violations() {
        let order = classify_db_error(Some("23505"), Some(LIST_ORDER_CONSTRAINT), "dup");
        assert!(matches!(order, Some(AppError::IntegrityConflict(_))));

        for (constraint, field) in [
            (LIST_BOOK_CONSTRAINT, "book"),
            (BOOK_CARD_CONSTRAINT, "book"),
            (USERNAME_CONSTRAINT, "username"),
        ] {
            match classify_db_error(Some("23505"), Some(constraint), "dup") {
                Some(AppError::InvalidFields(fields)) => {
                    assert!(fields.contains_key(field), "{} -> {:?}", constraint, fields)
                }
                other => panic!("unexpected {:?} for {}", other, constraint),
            }
        }
    }

    #[test]
    fn test_classify_leaves_other_errors_alone() {
        assert!(classify_db_error(Some("23505"), Some("books_pkey"), "dup").is_none());
        assert!(classify_db_error(Some("23503"), Some(LIST_BOOK_CONSTRAINT), "fk").is_none());
        assert!(classify_db_error(None, None, "io").is_none());

        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
