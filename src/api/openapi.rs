//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, book_cards, books, health, list_items, lists, notes, publishers, tags};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.3.0",
        description = "Personal library catalog: books, reading status, notes and curated lists",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Publishers
        publishers::list_publishers,
        publishers::create_publisher,
        publishers::get_publisher,
        publishers::update_publisher,
        publishers::delete_publisher,
        // Tags
        tags::list_tags,
        tags::create_tag,
        tags::get_tag,
        tags::update_tag,
        tags::delete_tag,
        // Notes
        notes::list_notes,
        notes::create_note,
        notes::get_note,
        notes::update_note,
        notes::delete_note,
        // Book cards
        book_cards::list_book_cards,
        book_cards::create_book_card,
        book_cards::get_book_card,
        book_cards::update_book_card,
        book_cards::delete_book_card,
        // Lists
        lists::list_lists,
        lists::create_list,
        lists::get_list,
        lists::update_list,
        lists::delete_list,
        // List items
        list_items::create_list_item,
        list_items::get_list_item,
        list_items::update_list_item,
        list_items::delete_list_item,
        list_items::move_list_item,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::CreateUser,
            crate::models::user::UserDetail,
            crate::models::user::UserMinimal,
            // Books
            crate::models::book::BookList,
            crate::models::book::BookDetail,
            crate::models::book::BookRecord,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::pagination::PaginatedBooks,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorShort,
            crate::models::author::AuthorRecord,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Publishers and tags
            crate::models::publisher::Publisher,
            crate::models::publisher::CreatePublisher,
            crate::models::publisher::UpdatePublisher,
            crate::models::tag::Tag,
            crate::models::tag::CreateTag,
            crate::models::tag::UpdateTag,
            // Notes and book cards
            crate::models::note::Note,
            crate::models::note::CreateNote,
            crate::models::note::UpdateNote,
            crate::models::book_card::BookCard,
            crate::models::book_card::CreateBookCard,
            crate::models::book_card::UpdateBookCard,
            // Lists
            crate::models::list::ListSummary,
            crate::models::list::ListDetail,
            crate::models::list::ListItemSummary,
            crate::models::list::ListItemDetail,
            crate::models::list::ListItemRecord,
            crate::models::list::CreateList,
            crate::models::list::UpdateList,
            crate::models::list::CreateListItem,
            crate::models::list::UpdateListItem,
            crate::models::list::MoveListItem,
            crate::ordering::Direction,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Token login and registration"),
        (name = "books", description = "Book catalog"),
        (name = "authors", description = "Authors"),
        (name = "publishers", description = "Publishers"),
        (name = "tags", description = "Tags"),
        (name = "notes", description = "Private notes on books"),
        (name = "book_cards", description = "Reading status per book"),
        (name = "lists", description = "Curated book lists"),
        (name = "list_items", description = "Ordered list entries")
    )
)]
pub struct ApiDoc;

/// Registers the `Authorization: Token <jwt>` scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
