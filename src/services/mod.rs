//! Business logic services

pub mod auth;
pub mod book_cards;
pub mod catalog;
pub mod lists;
pub mod notes;

use crate::{config::AppConfig, error::AppResult, media::MediaUrls, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub notes: notes::NotesService,
    pub book_cards: book_cards::BookCardsService,
    pub lists: lists::ListsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let media = MediaUrls::new(config.media.clone());
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone(), media.clone()),
            catalog: catalog::CatalogService::new(
                repository.clone(),
                media.clone(),
                config.pagination.page_size,
            ),
            notes: notes::NotesService::new(repository.clone()),
            book_cards: book_cards::BookCardsService::new(repository.clone()),
            lists: lists::ListsService::new(repository.clone(), media),
            repository,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
