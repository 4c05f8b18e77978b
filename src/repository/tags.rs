//! Tags repository

use sqlx::{Pool, Postgres};

use super::contains_pattern;
use crate::{
    access::Stamped,
    error::{AppError, AppResult},
    models::tag::{CreateTag, Tag, UpdateTag},
};

#[derive(Clone)]
pub struct TagsRepository {
    pool: Pool<Postgres>,
}

impl TagsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All tags, optionally filtered by a title substring
    pub async fn list(&self, query: Option<&str>) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, title, user_id FROM tags
            WHERE ($1::text IS NULL OR title ILIKE $1)
            ORDER BY title, id
            "#,
        )
        .bind(contains_pattern(query))
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>("SELECT id, title, user_id FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))
    }

    pub async fn create(&self, data: &Stamped<CreateTag>) -> AppResult<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (user_id, title) VALUES ($1, $2) RETURNING id, title, user_id",
        )
        .bind(data.owner_id)
        .bind(data.payload.title.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(tag)
    }

    pub async fn update(&self, id: i64, data: &UpdateTag) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags SET title = COALESCE($1, title)
            WHERE id = $2
            RETURNING id, title, user_id
            "#,
        )
        .bind(data.title.as_deref().map(str::trim))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag {} not found", id)));
        }
        Ok(())
    }
}
