//! Repository layer for database operations

pub mod authors;
pub mod book_cards;
pub mod books;
pub mod lists;
pub mod notes;
pub mod publishers;
pub mod tags;
pub mod users;

use sqlx::{PgExecutor, Pool, Postgres};

use crate::error::{AppError, AppResult};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub tags: tags::TagsRepository,
    pub publishers: publishers::PublishersRepository,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub notes: notes::NotesRepository,
    pub book_cards: book_cards::BookCardsRepository,
    pub lists: lists::ListsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            tags: tags::TagsRepository::new(pool.clone()),
            publishers: publishers::PublishersRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            notes: notes::NotesRepository::new(pool.clone()),
            book_cards: book_cards::BookCardsRepository::new(pool.clone()),
            lists: lists::ListsRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// `%value%` for ILIKE, with LIKE wildcards in the user input escaped.
/// Blank input means no filter.
pub(crate) fn contains_pattern(query: Option<&str>) -> Option<String> {
    let query = query.map(str::trim).filter(|q| !q.is_empty())?;
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// Apply a PATCH value: absent keeps `current`, `null` clears it.
pub(crate) fn patch<T>(current: Option<T>, update: Option<Option<T>>) -> Option<T> {
    match update {
        Some(value) => value,
        None => current,
    }
}

/// Reject payload references to rows that do not exist.
///
/// Referenced ids are request values, so a dangling one is a field error on
/// `field` rather than a 404.
pub(crate) async fn ensure_exist<'c, E>(
    executor: E,
    table: &'static str,
    field: &str,
    ids: &[i64],
) -> AppResult<()>
where
    E: PgExecutor<'c>,
{
    if ids.is_empty() {
        return Ok(());
    }

    let query = format!("SELECT id FROM {} WHERE id = ANY($1)", table);
    let found: Vec<i64> = sqlx::query_scalar(&query)
        .bind(ids)
        .fetch_all(executor)
        .await?;

    match ids.iter().find(|id| !found.contains(id)) {
        Some(&missing) => Err(AppError::missing_reference(field, missing)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(Some("war")).as_deref(), Some("%war%"));
        assert_eq!(contains_pattern(Some("100%_")).as_deref(), Some("%100\\%\\_%"));
        assert_eq!(contains_pattern(Some("   ")), None);
        assert_eq!(contains_pattern(None), None);
    }

    #[test]
    fn test_patch_semantics() {
        assert_eq!(patch(Some(1), None), Some(1));
        assert_eq!(patch(Some(1), Some(None)), None);
        assert_eq!(patch(None, Some(Some(2))), Some(2));
    }
}
