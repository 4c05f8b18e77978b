//! Authors repository

use sqlx::{Pool, Postgres};

use super::{contains_pattern, patch};
use crate::{
    access::Stamped,
    error::{AppError, AppResult},
    models::author::{AuthorRow, CreateAuthor, UpdateAuthor},
};

/// Author columns with the curator's username and picture joined in
pub(crate) const AUTHOR_COLUMNS: &str = r#"
    a.id, a.user_id, a.first_name, a.middle_name, a.last_name, a.description, a.portrait,
    u.username AS user_username, u.profile_image AS user_profile_image
"#;

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All authors ordered by last name, optionally filtered on it
    pub async fn list(&self, query: Option<&str>) -> AppResult<Vec<AuthorRow>> {
        let sql = format!(
            r#"
            SELECT {AUTHOR_COLUMNS}
            FROM authors a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE ($1::text IS NULL OR a.last_name ILIKE $1)
            ORDER BY a.last_name, a.first_name NULLS FIRST, a.id
            "#
        );
        let rows = sqlx::query_as::<_, AuthorRow>(&sql)
            .bind(contains_pattern(query))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<AuthorRow> {
        let sql = format!(
            r#"
            SELECT {AUTHOR_COLUMNS}
            FROM authors a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE a.id = $1
            "#
        );
        sqlx::query_as::<_, AuthorRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    pub async fn create(&self, data: &Stamped<CreateAuthor>) -> AppResult<AuthorRow> {
        let author = &data.payload;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO authors (user_id, first_name, middle_name, last_name, description, portrait)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(data.owner_id)
        .bind(&author.first_name)
        .bind(&author.middle_name)
        .bind(author.last_name.trim())
        .bind(&author.description)
        .bind(&author.portrait)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Partial update; `null` clears an optional column
    pub async fn update(&self, id: i64, data: &UpdateAuthor) -> AppResult<AuthorRow> {
        let current = self.get_by_id(id).await?;

        sqlx::query(
            r#"
            UPDATE authors
            SET first_name = $1, middle_name = $2, last_name = $3, description = $4, portrait = $5
            WHERE id = $6
            "#,
        )
        .bind(patch(current.first_name, data.first_name.clone()))
        .bind(patch(current.middle_name, data.middle_name.clone()))
        .bind(
            data.last_name
                .as_deref()
                .map(str::trim)
                .unwrap_or(&current.last_name),
        )
        .bind(patch(current.description, data.description.clone()))
        .bind(patch(current.portrait, data.portrait.clone()))
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }
}
