//! Bookshelf server
//!
//! REST JSON API for a personal library catalog: books with their authors,
//! publishers and tags, per-user reading status and notes, and curated
//! book lists with a stable item order.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod access;
pub mod api;
pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod ordering;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/token/login/", post(api::auth::login))
        .route("/users/", post(api::auth::register))
        .route("/user/details/", get(api::auth::me))
        // Books
        .route("/books/", get(api::books::list_books))
        .route("/books/create/", post(api::books::create_book))
        .route(
            "/books/:id/",
            get(api::books::get_book)
                .patch(api::books::update_book)
                .delete(api::books::delete_book),
        )
        // Authors
        .route("/authors/", get(api::authors::list_authors))
        .route("/authors/create/", post(api::authors::create_author))
        .route(
            "/authors/:id/",
            get(api::authors::get_author)
                .patch(api::authors::update_author)
                .delete(api::authors::delete_author),
        )
        // Publishers
        .route(
            "/publishers/",
            get(api::publishers::list_publishers).post(api::publishers::create_publisher),
        )
        .route(
            "/publishers/:id/",
            get(api::publishers::get_publisher)
                .patch(api::publishers::update_publisher)
                .delete(api::publishers::delete_publisher),
        )
        // Tags
        .route("/tags/", get(api::tags::list_tags).post(api::tags::create_tag))
        .route(
            "/tags/:id/",
            get(api::tags::get_tag)
                .patch(api::tags::update_tag)
                .delete(api::tags::delete_tag),
        )
        // Notes
        .route("/notes/", get(api::notes::list_notes))
        .route("/notes/create/", post(api::notes::create_note))
        .route(
            "/notes/:id/",
            get(api::notes::get_note)
                .patch(api::notes::update_note)
                .delete(api::notes::delete_note),
        )
        // Book cards
        .route("/book_cards/", get(api::book_cards::list_book_cards))
        .route("/book_cards/create/", post(api::book_cards::create_book_card))
        .route(
            "/book_cards/:id/",
            get(api::book_cards::get_book_card)
                .patch(api::book_cards::update_book_card)
                .delete(api::book_cards::delete_book_card),
        )
        // Lists
        .route("/lists/", get(api::lists::list_lists))
        .route("/lists/create/", post(api::lists::create_list))
        .route(
            "/lists/:id/",
            get(api::lists::get_list)
                .patch(api::lists::update_list)
                .delete(api::lists::delete_list),
        )
        // List items
        .route("/list_items/create/", post(api::list_items::create_list_item))
        .route(
            "/list_items/:id/",
            get(api::list_items::get_list_item)
                .patch(api::list_items::update_list_item)
                .delete(api::list_items::delete_list_item),
        )
        .route("/list_items/:id/move/", post(api::list_items::move_list_item))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
