//! Book cards: a user's reading status for one book

use sqlx::{Pool, Postgres};

use super::{ensure_exist, patch};
use crate::{
    access::Stamped,
    error::{AppError, AppResult},
    models::book_card::{BookCard, CreateBookCard, UpdateBookCard},
};

#[derive(Clone)]
pub struct BookCardsRepository {
    pool: Pool<Postgres>,
}

impl BookCardsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: i64, book_id: Option<i64>) -> AppResult<Vec<BookCard>> {
        let cards = sqlx::query_as::<_, BookCard>(
            r#"
            SELECT * FROM book_cards
            WHERE user_id = $1 AND ($2::bigint IS NULL OR book_id = $2)
            ORDER BY updated DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(cards)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<BookCard> {
        sqlx::query_as::<_, BookCard>("SELECT * FROM book_cards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book card {} not found", id)))
    }

    /// One card per (user, book); a second one is a field error on `book`
    pub async fn create(&self, data: &Stamped<CreateBookCard>) -> AppResult<BookCard> {
        let card = &data.payload;
        ensure_exist(&self.pool, "books", "book", &[card.book]).await?;

        let created = sqlx::query_as::<_, BookCard>(
            r#"
            INSERT INTO book_cards (user_id, book_id, is_favorite, want_to_read, is_reading, is_read, read_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.owner_id)
        .bind(card.book)
        .bind(card.is_favorite)
        .bind(card.want_to_read)
        .bind(card.is_reading)
        .bind(card.is_read)
        .bind(card.read_on)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    pub async fn update(&self, id: i64, data: &UpdateBookCard) -> AppResult<BookCard> {
        let current = self.get_by_id(id).await?;

        sqlx::query_as::<_, BookCard>(
            r#"
            UPDATE book_cards SET
                is_favorite = $1, want_to_read = $2, is_reading = $3, is_read = $4,
                read_on = $5, updated = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(data.is_favorite.unwrap_or(current.is_favorite))
        .bind(data.want_to_read.unwrap_or(current.want_to_read))
        .bind(data.is_reading.unwrap_or(current.is_reading))
        .bind(data.is_read.unwrap_or(current.is_read))
        .bind(patch(current.read_on, data.read_on))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book card {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_cards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book card {} not found", id)));
        }
        Ok(())
    }
}
