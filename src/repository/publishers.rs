//! Publishers repository

use sqlx::{Pool, Postgres};

use super::contains_pattern;
use crate::{
    access::Stamped,
    error::{AppError, AppResult},
    models::publisher::{CreatePublisher, Publisher, UpdatePublisher},
};

#[derive(Clone)]
pub struct PublishersRepository {
    pool: Pool<Postgres>,
}

impl PublishersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All publishers, optionally filtered by a title substring
    pub async fn list(&self, query: Option<&str>) -> AppResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>(
            r#"
            SELECT id, title, user_id FROM publishers
            WHERE ($1::text IS NULL OR title ILIKE $1)
            ORDER BY title, id
            "#,
        )
        .bind(contains_pattern(query))
        .fetch_all(&self.pool)
        .await?;
        Ok(publishers)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>("SELECT id, title, user_id FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publisher {} not found", id)))
    }

    pub async fn create(&self, data: &Stamped<CreatePublisher>) -> AppResult<Publisher> {
        let publisher = sqlx::query_as::<_, Publisher>(
            "INSERT INTO publishers (user_id, title) VALUES ($1, $2) RETURNING id, title, user_id",
        )
        .bind(data.owner_id)
        .bind(data.payload.title.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(publisher)
    }

    pub async fn update(&self, id: i64, data: &UpdatePublisher) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>(
            r#"
            UPDATE publishers SET title = COALESCE($1, title)
            WHERE id = $2
            RETURNING id, title, user_id
            "#,
        )
        .bind(data.title.as_deref().map(str::trim))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Publisher {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Publisher {} not found", id)));
        }
        Ok(())
    }
}
