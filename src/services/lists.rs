//! Lists and their ordered items.
//!
//! Visibility and ownership come from the parent list; positions are kept
//! dense by the repository, which runs every item mutation through the
//! ordering engine.

use std::collections::HashMap;

use validator::Validate;

use crate::{
    access::{ensure, stamp_owner, visible_lists, Action, Caller},
    error::{AppError, AppResult},
    media::MediaUrls,
    models::{
        book::BookBundle,
        list::{
            CreateList, CreateListItem, ListDetail, ListItemDetail, ListItemRecord, ListItemRow,
            ListQuery, ListRow, ListSummary, UpdateList, UpdateListItem,
        },
    },
    ordering::Direction,
    repository::Repository,
};

/// Items of one or more lists with their books loaded
struct LoadedItems {
    items: Vec<ListItemRow>,
    books: HashMap<i64, BookBundle>,
}

impl LoadedItems {
    fn of_list(&self, list_id: i64) -> Vec<(&ListItemRow, &BookBundle)> {
        self.items
            .iter()
            .filter(|item| item.list_id == list_id)
            .filter_map(|item| self.books.get(&item.book_id).map(|book| (item, book)))
            .collect()
    }
}

#[derive(Clone)]
pub struct ListsService {
    repository: Repository,
    media: MediaUrls,
}

impl ListsService {
    pub fn new(repository: Repository, media: MediaUrls) -> Self {
        Self { repository, media }
    }

    async fn load_items(&self, list_ids: &[i64]) -> AppResult<LoadedItems> {
        let items = self.repository.lists.items_of(list_ids).await?;
        let mut book_ids: Vec<i64> = items.iter().map(|i| i.book_id).collect();
        book_ids.sort_unstable();
        book_ids.dedup();
        let books = self.repository.books.get_many(&book_ids).await?;
        Ok(LoadedItems { items, books })
    }

    async fn detail(&self, list: &ListRow) -> AppResult<ListDetail> {
        let loaded = self.load_items(&[list.id]).await?;
        Ok(ListDetail::render(list, &loaded.of_list(list.id), &self.media))
    }

    /// Parent list of an item, for access checks
    async fn parent(&self, item: &ListItemRow) -> AppResult<ListRow> {
        self.repository.lists.get_by_id(item.list_id).await
    }

    // =========================================================================
    // LISTS
    // =========================================================================

    /// Public lists plus the caller's own, or only the caller's own
    pub async fn list(&self, caller: Caller, query: &ListQuery) -> AppResult<Vec<ListSummary>> {
        let scope = visible_lists(caller, query.only_own_lists.unwrap_or(false))?;
        let lists = self.repository.lists.list(scope, query.book_id).await?;

        let ids: Vec<i64> = lists.iter().map(|l| l.id).collect();
        let loaded = self.load_items(&ids).await?;

        Ok(lists
            .iter()
            .map(|list| ListSummary::render(list, &loaded.of_list(list.id), &self.media))
            .collect())
    }

    pub async fn get(&self, caller: Caller, id: i64) -> AppResult<ListDetail> {
        let list = self.repository.lists.get_by_id(id).await?;
        ensure(caller, &list.resource(), Action::Read)?;
        self.detail(&list).await
    }

    pub async fn create(&self, caller: Caller, data: CreateList) -> AppResult<ListDetail> {
        let data = stamp_owner(caller, data)?;
        data.payload.validate()?;

        let list = self.repository.lists.create(&data).await?;
        Ok(ListDetail::render(&list, &[], &self.media))
    }

    pub async fn update(&self, caller: Caller, id: i64, data: UpdateList) -> AppResult<ListDetail> {
        let current = self.repository.lists.get_by_id(id).await?;
        ensure(caller, &current.resource(), Action::Update)?;
        data.validate()?;

        let list = self.repository.lists.update(id, &data).await?;
        self.detail(&list).await
    }

    pub async fn delete(&self, caller: Caller, id: i64) -> AppResult<()> {
        let list = self.repository.lists.get_by_id(id).await?;
        ensure(caller, &list.resource(), Action::Delete)?;
        self.repository.lists.delete(id).await
    }

    // =========================================================================
    // ITEMS
    // =========================================================================

    pub async fn get_item(&self, caller: Caller, id: i64) -> AppResult<ListItemDetail> {
        let item = self.repository.lists.get_item(id).await?;
        let list = self.parent(&item).await?;
        ensure(caller, &list.item_resource(), Action::Read)?;

        let book = self.repository.books.get_by_id(item.book_id).await?;
        Ok(ListItemDetail::render(&item, &book, &self.media))
    }

    /// Append a book to a list, or insert it at `position`
    pub async fn add_item(&self, caller: Caller, data: CreateListItem) -> AppResult<ListItemRecord> {
        caller.require_user()?;
        data.validate()?;

        let list = match self.repository.lists.get_by_id(data.list).await {
            Ok(list) => list,
            Err(AppError::NotFound(_)) => return Err(AppError::missing_reference("list", data.list)),
            Err(e) => return Err(e),
        };
        ensure(caller, &list.item_resource(), Action::Create)?;

        let item = self
            .repository
            .lists
            .add_item(list.id, data.book, data.description.as_deref(), data.position)
            .await?;
        Ok(ListItemRecord::from(&item))
    }

    /// Edit an item's description
    pub async fn update_item(&self, caller: Caller, id: i64, data: UpdateListItem) -> AppResult<ListItemRecord> {
        let item = self.repository.lists.get_item(id).await?;
        let list = self.parent(&item).await?;
        ensure(caller, &list.item_resource(), Action::Update)?;

        let item = self.repository.lists.update_item(id, &data).await?;
        Ok(ListItemRecord::from(&item))
    }

    pub async fn delete_item(&self, caller: Caller, id: i64) -> AppResult<()> {
        let item = self.repository.lists.get_item(id).await?;
        let list = self.parent(&item).await?;
        ensure(caller, &list.item_resource(), Action::Delete)?;

        self.repository.lists.remove_item(id).await
    }

    /// Move an item and return the whole list in its new order
    pub async fn move_item(&self, caller: Caller, id: i64, direction: Direction) -> AppResult<Vec<ListItemRecord>> {
        let item = self.repository.lists.get_item(id).await?;
        let list = self.parent(&item).await?;
        ensure(caller, &list.item_resource(), Action::Update)?;

        let items = self.repository.lists.move_item(id, direction).await?;
        Ok(items.iter().map(ListItemRecord::from).collect())
    }
}
