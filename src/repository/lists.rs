//! Lists and list items.
//!
//! Every change to the items of a list runs in one transaction that locks
//! the parent `lists` row, loads the items into an [`OrderedList`], applies
//! the operation there and writes back the returned repositions. The
//! `(list_id, "order")` constraint is deferred, so intermediate duplicate
//! positions are fine until commit.

use sqlx::{PgConnection, PgExecutor, Pool, Postgres};

use super::patch;
use crate::{
    access::{ListScope, Stamped},
    error::{AppError, AppResult},
    models::list::{CreateList, ListItemRow, ListRow, UpdateList, UpdateListItem},
    ordering::{Direction, OrderedList, Reposition, Slot},
};

const LIST_COLUMNS: &str = r#"
    l.id, l.user_id, l.title, l.description, l.is_public, l.created, l.updated,
    u.username AS user_username, u.profile_image AS user_profile_image
"#;

const ITEM_COLUMNS: &str = r#"id, list_id, book_id, "order", description, created, updated"#;

#[derive(Clone)]
pub struct ListsRepository {
    pool: Pool<Postgres>,
}

impl ListsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // LISTS
    // =========================================================================

    /// Lists visible in `scope`, optionally only those containing `book_id`
    pub async fn list(&self, scope: ListScope, book_id: Option<i64>) -> AppResult<Vec<ListRow>> {
        let (owner, include_public) = match scope {
            ListScope::PublicOnly => (None, true),
            ListScope::PublicOrOwnedBy(id) => (Some(id), true),
            ListScope::OwnedBy(id) => (Some(id), false),
        };

        let sql = format!(
            r#"
            SELECT {LIST_COLUMNS}
            FROM lists l
            LEFT JOIN users u ON u.id = l.user_id
            WHERE (($2 AND l.is_public) OR l.user_id = $1)
              AND ($3::bigint IS NULL OR EXISTS (
                    SELECT 1 FROM list_items li WHERE li.list_id = l.id AND li.book_id = $3))
            ORDER BY l.created DESC, l.id DESC
            "#
        );
        let rows = sqlx::query_as::<_, ListRow>(&sql)
            .bind(owner)
            .bind(include_public)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<ListRow> {
        let sql = format!(
            "SELECT {LIST_COLUMNS} FROM lists l LEFT JOIN users u ON u.id = l.user_id WHERE l.id = $1"
        );
        sqlx::query_as::<_, ListRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("List {} not found", id)))
    }

    pub async fn create(&self, data: &Stamped<CreateList>) -> AppResult<ListRow> {
        let list = &data.payload;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO lists (user_id, title, description, is_public)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(data.owner_id)
        .bind(list.title.trim())
        .bind(&list.description)
        .bind(list.is_public)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(list_id = id, owner = data.owner_id, "List created");
        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i64, data: &UpdateList) -> AppResult<ListRow> {
        let current = self.get_by_id(id).await?;

        sqlx::query(
            r#"
            UPDATE lists SET title = $1, description = $2, is_public = $3, updated = NOW()
            WHERE id = $4
            "#,
        )
        .bind(data.title.as_deref().map(str::trim).unwrap_or(&current.title))
        .bind(patch(current.description, data.description.clone()))
        .bind(data.is_public.unwrap_or(current.is_public))
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Delete a list; its items go with it
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("List {} not found", id)));
        }
        tracing::info!(list_id = id, "List deleted");
        Ok(())
    }

    // =========================================================================
    // ITEMS
    // =========================================================================

    /// Items of the given lists, each list's items in display order
    pub async fn items_of(&self, list_ids: &[i64]) -> AppResult<Vec<ListItemRow>> {
        if list_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"SELECT {ITEM_COLUMNS} FROM list_items WHERE list_id = ANY($1) ORDER BY list_id, "order", id"#
        );
        let rows = sqlx::query_as::<_, ListItemRow>(&sql)
            .bind(list_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_item(&self, id: i64) -> AppResult<ListItemRow> {
        fetch_item(&self.pool, id).await
    }

    /// Add a book to a list: appended at the end, or inserted at `position`
    /// (clamped to the end) with the following items shifted down.
    pub async fn add_item(
        &self,
        list_id: i64,
        book_id: i64,
        description: Option<&str>,
        position: Option<i32>,
    ) -> AppResult<ListItemRow> {
        let mut tx = self.pool.begin().await?;
        let mut list = lock_items(&mut tx, list_id).await?;

        let order = list.next_position(book_id)?;
        // Blocks a concurrent delete of the book until this commits
        let book: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR KEY SHARE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?;
        if book.is_none() {
            return Err(AppError::missing_reference("book", book_id));
        }

        let sql = format!(
            r#"
            INSERT INTO list_items (list_id, book_id, "order", description)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "#
        );
        let mut item = sqlx::query_as::<_, ListItemRow>(&sql)
            .bind(list_id)
            .bind(book_id)
            .bind(order)
            .bind(description)
            .fetch_one(&mut *tx)
            .await?;

        let changes = match position {
            Some(at) => list.insert(item.id, book_id, at)?,
            None => {
                list.append(item.id, book_id)?;
                Vec::new()
            }
        };
        apply(&mut tx, &changes).await?;

        if let Some(slot) = list.get(item.id).filter(|slot| slot.order != item.order) {
            item.order = slot.order;
            sqlx::query(r#"UPDATE list_items SET "order" = $1 WHERE id = $2"#)
                .bind(slot.order)
                .bind(item.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(
            list_id,
            item_id = item.id,
            book_id,
            order = item.order,
            shifted = changes.len(),
            "List item added"
        );
        Ok(item)
    }

    /// Edit an item's description; its position is not touched
    pub async fn update_item(&self, id: i64, data: &UpdateListItem) -> AppResult<ListItemRow> {
        let current = self.get_item(id).await?;
        let sql = format!(
            r#"
            UPDATE list_items SET description = $1, updated = NOW()
            WHERE id = $2
            RETURNING {ITEM_COLUMNS}
            "#
        );
        sqlx::query_as::<_, ListItemRow>(&sql)
            .bind(patch(current.description, data.description.clone()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("List item {} not found", id)))
    }

    /// Delete an item and close the gap it leaves
    pub async fn remove_item(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let item = fetch_item(&mut *tx, id).await?;
        let mut list = lock_items(&mut tx, item.list_id).await?;

        let (_, changes) = list.remove(id)?;
        sqlx::query("DELETE FROM list_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        apply(&mut tx, &changes).await?;

        tx.commit().await?;
        tracing::info!(list_id = item.list_id, item_id = id, shifted = changes.len(), "List item removed");
        Ok(())
    }

    /// Move an item within its list. Returns all items of the list in their
    /// new order.
    pub async fn move_item(&self, id: i64, direction: Direction) -> AppResult<Vec<ListItemRow>> {
        let mut tx = self.pool.begin().await?;
        let item = fetch_item(&mut *tx, id).await?;
        let mut list = lock_items(&mut tx, item.list_id).await?;

        let changes = list.move_item(id, direction)?;
        apply(&mut tx, &changes).await?;

        let items = fetch_items(&mut *tx, item.list_id).await?;
        tx.commit().await?;

        tracing::info!(
            list_id = item.list_id,
            item_id = id,
            ?direction,
            moved = changes.len(),
            "List item moved"
        );
        Ok(items)
    }
}

async fn fetch_item<'c, E>(executor: E, id: i64) -> AppResult<ListItemRow>
where
    E: PgExecutor<'c>,
{
    let sql = format!("SELECT {ITEM_COLUMNS} FROM list_items WHERE id = $1");
    sqlx::query_as::<_, ListItemRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("List item {} not found", id)))
}

async fn fetch_items<'c, E>(executor: E, list_id: i64) -> AppResult<Vec<ListItemRow>>
where
    E: PgExecutor<'c>,
{
    let sql = format!(r#"SELECT {ITEM_COLUMNS} FROM list_items WHERE list_id = $1 ORDER BY "order", id"#);
    let rows = sqlx::query_as::<_, ListItemRow>(&sql)
        .bind(list_id)
        .fetch_all(executor)
        .await?;
    Ok(rows)
}

/// Lock the parent list row and load its items.
///
/// Rows found with gaps or duplicate positions are renumbered in place.
async fn lock_items(conn: &mut PgConnection, list_id: i64) -> AppResult<OrderedList> {
    let locked: Option<i64> = sqlx::query_scalar("SELECT id FROM lists WHERE id = $1 FOR UPDATE")
        .bind(list_id)
        .fetch_optional(&mut *conn)
        .await?;
    if locked.is_none() {
        return Err(AppError::NotFound(format!("List {} not found", list_id)));
    }

    let rows = fetch_items(&mut *conn, list_id).await?;
    let mut list = OrderedList::new(list_id, rows.iter().map(Slot::from).collect());

    if !list.is_dense() {
        let repairs = list.reindex();
        tracing::warn!(list_id, repaired = repairs.len(), "List item order was not dense, renumbering");
        apply(conn, &repairs).await?;
    }
    Ok(list)
}

async fn apply(conn: &mut PgConnection, changes: &[Reposition]) -> AppResult<()> {
    for change in changes {
        sqlx::query(r#"UPDATE list_items SET "order" = $1 WHERE id = $2"#)
            .bind(change.to)
            .bind(change.item_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Take a book out of every list it is in, renumbering each list.
///
/// Runs inside the caller's transaction, before the book row is deleted.
pub(crate) async fn detach_book(conn: &mut PgConnection, book_id: i64) -> AppResult<()> {
    let memberships: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT list_id, id FROM list_items WHERE book_id = $1 ORDER BY list_id",
    )
    .bind(book_id)
    .fetch_all(&mut *conn)
    .await?;

    for (list_id, item_id) in memberships {
        let mut list = lock_items(&mut *conn, list_id).await?;
        let (_, changes) = list.remove(item_id)?;

        sqlx::query("DELETE FROM list_items WHERE id = $1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        apply(&mut *conn, &changes).await?;

        tracing::info!(list_id, item_id, book_id, shifted = changes.len(), "Book removed from list");
    }
    Ok(())
}
