//! Book cards: per-user reading status

use crate::{
    access::{ensure, stamp_owner, Action, Caller, Resource},
    error::AppResult,
    models::book_card::{BookCard, BookCardQuery, CreateBookCard, UpdateBookCard},
    repository::Repository,
};

#[derive(Clone)]
pub struct BookCardsService {
    repository: Repository,
}

impl BookCardsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, caller: Caller, query: &BookCardQuery) -> AppResult<Vec<BookCard>> {
        let user_id = caller.require_user()?;
        self.repository.book_cards.list_for_user(user_id, query.book_id).await
    }

    pub async fn get(&self, caller: Caller, id: i64) -> AppResult<BookCard> {
        let card = self.repository.book_cards.get_by_id(id).await?;
        ensure(caller, &Resource::BookCard { owner: card.user_id }, Action::Read)?;
        Ok(card)
    }

    pub async fn create(&self, caller: Caller, data: CreateBookCard) -> AppResult<BookCard> {
        let data = stamp_owner(caller, data)?;
        self.repository.book_cards.create(&data).await
    }

    pub async fn update(&self, caller: Caller, id: i64, data: UpdateBookCard) -> AppResult<BookCard> {
        let card = self.repository.book_cards.get_by_id(id).await?;
        ensure(caller, &Resource::BookCard { owner: card.user_id }, Action::Update)?;
        self.repository.book_cards.update(id, &data).await
    }

    pub async fn delete(&self, caller: Caller, id: i64) -> AppResult<()> {
        let card = self.repository.book_cards.get_by_id(id).await?;
        ensure(caller, &Resource::BookCard { owner: card.user_id }, Action::Delete)?;
        self.repository.book_cards.delete(id).await
    }
}
