//! Notes repository

use sqlx::{Pool, Postgres};

use super::ensure_exist;
use crate::{
    access::Stamped,
    error::{AppError, AppResult},
    models::note::{CreateNote, Note, UpdateNote},
};

#[derive(Clone)]
pub struct NotesRepository {
    pool: Pool<Postgres>,
}

impl NotesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// A user's notes, newest first, optionally for one book
    pub async fn list_for_user(&self, user_id: i64, book_id: Option<i64>) -> AppResult<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes
            WHERE user_id = $1 AND ($2::bigint IS NULL OR book_id = $2)
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Note> {
        sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Note {} not found", id)))
    }

    pub async fn create(&self, data: &Stamped<CreateNote>) -> AppResult<Note> {
        ensure_exist(&self.pool, "books", "book", &[data.payload.book]).await?;

        let note = sqlx::query_as::<_, Note>(
            "INSERT INTO notes (user_id, book_id, text) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.payload.book)
        .bind(&data.payload.text)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    pub async fn update(&self, id: i64, data: &UpdateNote) -> AppResult<Note> {
        sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes SET text = COALESCE($1, text), updated = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(&data.text)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Note {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }
}
