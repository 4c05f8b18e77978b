//! Catalog management service: books, authors, publishers and tags.
//!
//! Catalog entries are readable by anyone. Creating one needs an account
//! and stamps the caller as owner; only that owner may change or delete it.

use validator::Validate;

use crate::{
    access::{ensure, stamp_owner, Action, Caller, Resource},
    error::AppResult,
    media::MediaUrls,
    models::{
        author::{Author, AuthorQuery, AuthorRecord, CreateAuthor, UpdateAuthor},
        book::{BookDetail, BookList, BookQuery, BookRecord, CreateBook, UpdateBook},
        pagination::{Page, Paginated},
        publisher::{CreatePublisher, Publisher, PublisherQuery, UpdatePublisher},
        tag::{CreateTag, Tag, TagQuery, UpdateTag},
    },
    repository::Repository,
};

const BOOKS_PATH: &str = "/api/v1/books/";

fn entry(owner: Option<i64>) -> Resource {
    Resource::Catalog { owner }
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    media: MediaUrls,
    page_size: i64,
}

impl CatalogService {
    pub fn new(repository: Repository, media: MediaUrls, page_size: i64) -> Self {
        Self {
            repository,
            media,
            page_size,
        }
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    /// Search books, one page at a time
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<Paginated<BookList>> {
        let page = Page::parse(query.page.as_deref(), self.page_size)?;
        let search = query.query.as_deref();

        let (books, count) = self.repository.books.search(search, page).await?;
        let results = books.iter().map(|b| BookList::render(b, &self.media)).collect();

        Ok(Paginated::new(results, count, page, BOOKS_PATH, search))
    }

    pub async fn get_book(&self, caller: Caller, id: i64) -> AppResult<BookDetail> {
        let book = self.repository.books.get_by_id(id).await?;
        ensure(caller, &entry(book.row.user_id), Action::Read)?;
        Ok(BookDetail::render(&book, &self.media))
    }

    pub async fn create_book(&self, caller: Caller, data: CreateBook) -> AppResult<BookRecord> {
        let data = stamp_owner(caller, data)?;
        data.payload.validate()?;

        let book = self.repository.books.create(&data).await?;
        Ok(BookRecord::render(&book, &self.media))
    }

    pub async fn update_book(&self, caller: Caller, id: i64, data: UpdateBook) -> AppResult<BookRecord> {
        let current = self.repository.books.get_by_id(id).await?;
        ensure(caller, &entry(current.row.user_id), Action::Update)?;
        data.validate()?;

        let book = self.repository.books.update(id, &data).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(BookRecord::render(&book, &self.media))
    }

    pub async fn delete_book(&self, caller: Caller, id: i64) -> AppResult<()> {
        let current = self.repository.books.get_by_id(id).await?;
        ensure(caller, &entry(current.row.user_id), Action::Delete)?;
        self.repository.books.delete(id).await
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, query: &AuthorQuery) -> AppResult<Vec<Author>> {
        let rows = self.repository.authors.list(query.query.as_deref()).await?;
        Ok(rows.iter().map(|a| Author::render(a, &self.media)).collect())
    }

    pub async fn get_author(&self, caller: Caller, id: i64) -> AppResult<Author> {
        let author = self.repository.authors.get_by_id(id).await?;
        ensure(caller, &entry(author.user_id), Action::Read)?;
        Ok(Author::render(&author, &self.media))
    }

    pub async fn create_author(&self, caller: Caller, data: CreateAuthor) -> AppResult<AuthorRecord> {
        let data = stamp_owner(caller, data)?;
        data.payload.validate()?;

        let author = self.repository.authors.create(&data).await?;
        tracing::info!(author_id = author.id, owner = data.owner_id, "Author created");
        Ok(AuthorRecord::render(&author, &self.media))
    }

    pub async fn update_author(&self, caller: Caller, id: i64, data: UpdateAuthor) -> AppResult<AuthorRecord> {
        let current = self.repository.authors.get_by_id(id).await?;
        ensure(caller, &entry(current.user_id), Action::Update)?;
        data.validate()?;

        let author = self.repository.authors.update(id, &data).await?;
        Ok(AuthorRecord::render(&author, &self.media))
    }

    pub async fn delete_author(&self, caller: Caller, id: i64) -> AppResult<()> {
        let current = self.repository.authors.get_by_id(id).await?;
        ensure(caller, &entry(current.user_id), Action::Delete)?;
        self.repository.authors.delete(id).await
    }

    // =========================================================================
    // PUBLISHERS
    // =========================================================================

    pub async fn list_publishers(&self, query: &PublisherQuery) -> AppResult<Vec<Publisher>> {
        self.repository.publishers.list(query.query.as_deref()).await
    }

    pub async fn get_publisher(&self, caller: Caller, id: i64) -> AppResult<Publisher> {
        let publisher = self.repository.publishers.get_by_id(id).await?;
        ensure(caller, &entry(publisher.user_id), Action::Read)?;
        Ok(publisher)
    }

    pub async fn create_publisher(&self, caller: Caller, data: CreatePublisher) -> AppResult<Publisher> {
        let data = stamp_owner(caller, data)?;
        data.payload.validate()?;
        self.repository.publishers.create(&data).await
    }

    pub async fn update_publisher(&self, caller: Caller, id: i64, data: UpdatePublisher) -> AppResult<Publisher> {
        let current = self.repository.publishers.get_by_id(id).await?;
        ensure(caller, &entry(current.user_id), Action::Update)?;
        data.validate()?;
        self.repository.publishers.update(id, &data).await
    }

    pub async fn delete_publisher(&self, caller: Caller, id: i64) -> AppResult<()> {
        let current = self.repository.publishers.get_by_id(id).await?;
        ensure(caller, &entry(current.user_id), Action::Delete)?;
        self.repository.publishers.delete(id).await
    }

    // =========================================================================
    // TAGS
    // =========================================================================

    pub async fn list_tags(&self, query: &TagQuery) -> AppResult<Vec<Tag>> {
        self.repository.tags.list(query.query.as_deref()).await
    }

    pub async fn get_tag(&self, caller: Caller, id: i64) -> AppResult<Tag> {
        let tag = self.repository.tags.get_by_id(id).await?;
        ensure(caller, &entry(tag.user_id), Action::Read)?;
        Ok(tag)
    }

    pub async fn create_tag(&self, caller: Caller, data: CreateTag) -> AppResult<Tag> {
        let data = stamp_owner(caller, data)?;
        data.payload.validate()?;
        self.repository.tags.create(&data).await
    }

    pub async fn update_tag(&self, caller: Caller, id: i64, data: UpdateTag) -> AppResult<Tag> {
        let current = self.repository.tags.get_by_id(id).await?;
        ensure(caller, &entry(current.user_id), Action::Update)?;
        data.validate()?;
        self.repository.tags.update(id, &data).await
    }

    pub async fn delete_tag(&self, caller: Caller, id: i64) -> AppResult<()> {
        let current = self.repository.tags.get_by_id(id).await?;
        ensure(caller, &entry(current.user_id), Action::Delete)?;
        self.repository.tags.delete(id).await
    }
}
