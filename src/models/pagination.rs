//! Offset pagination and the paginated response envelope

use serde::Serialize;
use utoipa::ToSchema;

use super::book::BookList;
use crate::error::{AppError, AppResult};

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    /// Parse the raw `page` query value. Missing means the first page.
    pub fn parse(raw: Option<&str>, size: i64) -> AppResult<Self> {
        let number = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| AppError::NotFound("Invalid page.".to_string()))?,
        };
        Ok(Self {
            number,
            size: size.max(1),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    /// Number of pages for `count` rows; an empty result still has one page.
    pub fn total_pages(&self, count: i64) -> i64 {
        ((count + self.size - 1) / self.size).max(1)
    }

    /// Reject pages past the end once the row count is known
    pub fn check_bounds(&self, count: i64) -> AppResult<()> {
        if self.number > self.total_pages(count) {
            return Err(AppError::NotFound("Invalid page.".to_string()));
        }
        Ok(())
    }
}

/// Paginated response envelope
#[derive(Debug, Serialize, ToSchema)]
#[aliases(PaginatedBooks = Paginated<BookList>)]
pub struct Paginated<T> {
    /// Total number of matching rows
    pub count: i64,
    /// Relative link to the next page
    pub next: Option<String>,
    /// Relative link to the previous page
    pub previous: Option<String>,
    /// Current page number (1-based)
    pub page: i64,
    pub total_pages: i64,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wrap one page of results. `base_path` and `query` are used to build
    /// the `next`/`previous` links.
    pub fn new(results: Vec<T>, count: i64, page: Page, base_path: &str, query: Option<&str>) -> Self {
        let total_pages = page.total_pages(count);
        let link = |number: i64| page_link(base_path, number, query);

        Self {
            count,
            next: (page.number < total_pages).then(|| link(page.number + 1)),
            previous: (page.number > 1).then(|| link(page.number - 1)),
            page: page.number,
            total_pages,
            results,
        }
    }
}

fn page_link(base_path: &str, number: i64, query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{}?page={}&query={}", base_path, number, urlencoding::encode(q)),
        None => format!("{}?page={}", base_path, number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        assert_eq!(Page::parse(None, 10).unwrap().number, 1);
        assert_eq!(Page::parse(Some(""), 10).unwrap().number, 1);
        assert_eq!(Page::parse(Some("3"), 10).unwrap().offset(), 20);
        assert!(matches!(Page::parse(Some("0"), 10), Err(AppError::NotFound(_))));
        assert!(matches!(Page::parse(Some("abc"), 10), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_total_pages() {
        let page = Page::parse(None, 10).unwrap();
        assert_eq!(page.total_pages(0), 1);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
        assert!(page.check_bounds(0).is_ok());
    }

    #[test]
    fn test_page_past_end_is_not_found() {
        let page = Page::parse(Some("3"), 10).unwrap();
        assert!(page.check_bounds(25).is_ok());
        assert!(page.check_bounds(20).is_err());
    }

    #[test]
    fn test_links() {
        let page = Page::parse(Some("2"), 10).unwrap();
        let envelope = Paginated::new(vec![1, 2], 35, page, "/api/v1/books/", Some("war and peace"));

        assert_eq!(envelope.total_pages, 4);
        assert_eq!(
            envelope.next.as_deref(),
            Some("/api/v1/books/?page=3&query=war%20and%20peace")
        );
        assert_eq!(
            envelope.previous.as_deref(),
            Some("/api/v1/books/?page=1&query=war%20and%20peace")
        );
    }

    #[test]
    fn test_single_page_has_no_links() {
        let page = Page::parse(None, 10).unwrap();
        let envelope = Paginated::new(vec!["a"], 1, page, "/api/v1/books/", None);
        assert_eq!(envelope.next, None);
        assert_eq!(envelope.previous, None);
        assert_eq!(envelope.page, 1);
    }
}
