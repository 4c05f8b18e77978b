//! Books repository: search, relation loading and transactional writes

use std::collections::HashMap;

use sqlx::{FromRow, PgConnection, Pool, Postgres};

use super::{authors::AUTHOR_COLUMNS, contains_pattern, ensure_exist, lists, patch};
use crate::{
    access::Stamped,
    error::{AppError, AppResult},
    models::{
        author::AuthorRow,
        book::{normalize_isbn, BookBundle, BookRow, CreateBook, UpdateBook},
        pagination::Page,
        tag::Tag,
    },
};

const BOOK_COLUMNS: &str = r#"
    b.id, b.user_id, b.title, b.year, b.pages, b.publisher_id, b.isbn, b.description,
    b.contents, b.cover_image, b.file, b.created, b.updated,
    u.username AS user_username, u.profile_image AS user_profile_image,
    p.title AS publisher_title, p.user_id AS publisher_user_id
"#;

const BOOK_FROM: &str = r#"
    FROM books b
    LEFT JOIN users u ON u.id = b.user_id
    LEFT JOIN publishers p ON p.id = b.publisher_id
"#;

/// `$1` is a `%…%` pattern or NULL for no filter
const SEARCH_FILTER: &str = r#"
    ($1::text IS NULL
        OR b.title ILIKE $1
        OR b.description ILIKE $1
        OR b.contents ILIKE $1
        OR EXISTS (
            SELECT 1 FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = b.id AND a.last_name ILIKE $1
        ))
"#;

#[derive(FromRow)]
struct BookAuthorRow {
    book_id: i64,
    #[sqlx(flatten)]
    author: AuthorRow,
}

#[derive(FromRow)]
struct BookTagRow {
    book_id: i64,
    #[sqlx(flatten)]
    tag: Tag,
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// One page of books, newest first, matching `query` against title,
    /// description, contents and author last names.
    pub async fn search(&self, query: Option<&str>, page: Page) -> AppResult<(Vec<BookBundle>, i64)> {
        let pattern = contains_pattern(query);

        let count_sql = format!("SELECT COUNT(*) FROM books b WHERE {SEARCH_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        page.check_bounds(total)?;

        let select_sql = format!(
            "SELECT {BOOK_COLUMNS} {BOOK_FROM} WHERE {SEARCH_FILTER} \
             ORDER BY b.created DESC, b.id DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, BookRow>(&select_sql)
            .bind(&pattern)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((self.bundle(rows).await?, total))
    }

    /// Get a book with its authors and tags
    pub async fn get_by_id(&self, id: i64) -> AppResult<BookBundle> {
        let sql = format!("SELECT {BOOK_COLUMNS} {BOOK_FROM} WHERE b.id = $1");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        self.bundle(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Load several books at once, keyed by id
    pub async fn get_many(&self, ids: &[i64]) -> AppResult<HashMap<i64, BookBundle>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!("SELECT {BOOK_COLUMNS} {BOOK_FROM} WHERE b.id = ANY($1)");
        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(self
            .bundle(rows)
            .await?
            .into_iter()
            .map(|book| (book.row.id, book))
            .collect())
    }

    /// Attach authors and tags to book rows, keeping the row order
    async fn bundle(&self, rows: Vec<BookRow>) -> AppResult<Vec<BookBundle>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let authors_sql = format!(
            r#"
            SELECT ba.book_id, {AUTHOR_COLUMNS}
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            LEFT JOIN users u ON u.id = a.user_id
            WHERE ba.book_id = ANY($1)
            ORDER BY a.last_name, a.id
            "#
        );
        let author_rows = sqlx::query_as::<_, BookAuthorRow>(&authors_sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let tag_rows = sqlx::query_as::<_, BookTagRow>(
            r#"
            SELECT bt.book_id, t.id, t.title, t.user_id
            FROM book_tags bt
            JOIN tags t ON t.id = bt.tag_id
            WHERE bt.book_id = ANY($1)
            ORDER BY t.title, t.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut authors: HashMap<i64, Vec<AuthorRow>> = HashMap::new();
        for row in author_rows {
            authors.entry(row.book_id).or_default().push(row.author);
        }
        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags.entry(row.book_id).or_default().push(row.tag);
        }

        Ok(rows
            .into_iter()
            .map(|row| BookBundle {
                authors: authors.remove(&row.id).unwrap_or_default(),
                tags: tags.remove(&row.id).unwrap_or_default(),
                row,
            })
            .collect())
    }

    /// Create a book and its author/tag links in one transaction
    pub async fn create(&self, data: &Stamped<CreateBook>) -> AppResult<BookBundle> {
        let book = &data.payload;
        let mut tx = self.pool.begin().await?;

        check_references(&mut tx, book.publisher, Some(&book.authors), Some(&book.tags)).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (user_id, title, year, pages, publisher_id, isbn,
                               description, contents, cover_image, file)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(data.owner_id)
        .bind(book.title.trim())
        .bind(book.year)
        .bind(book.pages)
        .bind(book.publisher)
        .bind(stored_isbn(book.isbn.as_deref()))
        .bind(&book.description)
        .bind(&book.contents)
        .bind(&book.cover_image)
        .bind(&book.file)
        .fetch_one(&mut *tx)
        .await?;

        set_authors(&mut tx, id, &book.authors).await?;
        set_tags(&mut tx, id, &book.tags).await?;

        tx.commit().await?;
        tracing::info!(book_id = id, owner = data.owner_id, "Book created");

        self.get_by_id(id).await
    }

    /// Partial update; relation lists, when given, replace the current ones
    pub async fn update(&self, id: i64, data: &UpdateBook) -> AppResult<BookBundle> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {BOOK_COLUMNS} {BOOK_FROM} WHERE b.id = $1 FOR UPDATE OF b");
        let current = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        let publisher = patch(current.publisher_id, data.publisher);
        let changed_publisher = publisher.filter(|p| Some(*p) != current.publisher_id);
        check_references(&mut tx, changed_publisher, data.authors.as_deref(), data.tags.as_deref())
            .await?;

        let isbn = match &data.isbn {
            Some(isbn) => stored_isbn(isbn.as_deref()),
            None => current.isbn,
        };

        sqlx::query(
            r#"
            UPDATE books SET
                title = $1, year = $2, pages = $3, publisher_id = $4, isbn = $5,
                description = $6, contents = $7, cover_image = $8, file = $9,
                updated = NOW()
            WHERE id = $10
            "#,
        )
        .bind(data.title.as_deref().map(str::trim).unwrap_or(&current.title))
        .bind(patch(current.year, data.year))
        .bind(patch(current.pages, data.pages))
        .bind(publisher)
        .bind(isbn)
        .bind(patch(current.description, data.description.clone()))
        .bind(patch(current.contents, data.contents.clone()))
        .bind(patch(current.cover_image, data.cover_image.clone()))
        .bind(patch(current.file, data.file.clone()))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(authors) = &data.authors {
            sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            set_authors(&mut tx, id, authors).await?;
        }
        if let Some(tags) = &data.tags {
            sqlx::query("DELETE FROM book_tags WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            set_tags(&mut tx, id, tags).await?;
        }

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Delete a book, first taking it out of every list so that the
    /// remaining items of those lists are renumbered.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        lists::detach_book(&mut tx, id).await?;

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}

/// Empty or separator-only ISBNs are stored as NULL
fn stored_isbn(isbn: Option<&str>) -> Option<String> {
    isbn.map(normalize_isbn).filter(|s| !s.is_empty())
}

async fn check_references(
    conn: &mut PgConnection,
    publisher: Option<i64>,
    authors: Option<&[i64]>,
    tags: Option<&[i64]>,
) -> AppResult<()> {
    if let Some(publisher) = publisher {
        ensure_exist(&mut *conn, "publishers", "publisher", &[publisher]).await?;
    }
    if let Some(authors) = authors {
        ensure_exist(&mut *conn, "authors", "authors", authors).await?;
    }
    if let Some(tags) = tags {
        ensure_exist(&mut *conn, "tags", "tags", tags).await?;
    }
    Ok(())
}

async fn set_authors(conn: &mut PgConnection, book_id: i64, authors: &[i64]) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO book_authors (book_id, author_id)
        SELECT $1, UNNEST($2::bigint[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(authors)
    .execute(conn)
    .await?;
    Ok(())
}

async fn set_tags(conn: &mut PgConnection, book_id: i64, tags: &[i64]) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO book_tags (book_id, tag_id)
        SELECT $1, UNNEST($2::bigint[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(tags)
    .execute(conn)
    .await?;
    Ok(())
}
