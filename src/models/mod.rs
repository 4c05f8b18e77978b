//! Data models for Bookshelf

pub mod author;
pub mod book;
pub mod book_card;
pub mod list;
pub mod note;
pub mod pagination;
pub mod publisher;
pub mod tag;
pub mod user;

pub use author::Author;
pub use book::{BookDetail, BookList, BookRecord};
pub use book_card::BookCard;
pub use list::{ListDetail, ListItemRecord, ListSummary};
pub use note::Note;
pub use pagination::{Page, Paginated};
pub use publisher::Publisher;
pub use tag::Tag;
pub use user::{UserDetail, UserMinimal};

use validator::ValidationError;

/// Reject values that are empty once surrounding whitespace is trimmed.
///
/// Repositories store trimmed text, so a value of spaces only would
/// otherwise pass `length(min = 1)` and be saved empty.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("This field may not be blank.".into());
        Err(err)
    } else {
        Ok(())
    }
}
