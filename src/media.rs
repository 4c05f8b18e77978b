//! Media URL rendering.
//!
//! Uploaded files are stored as storage-relative paths (`images/covers/x.jpg`).
//! Responses always expose them as site-relative URLs under the configured
//! prefix, whatever the storage backend handed back. Thumbnails are produced
//! out of process; their URLs are derived from the source path.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::MediaConfig;

static SCHEME_AND_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^/]*").expect("valid regex"));

/// Named thumbnail variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumbnail {
    Small,
    Medium,
    Large,
    Portrait,
}

impl Thumbnail {
    fn dir(&self) -> &'static str {
        match self {
            Thumbnail::Small => "small",
            Thumbnail::Medium => "medium",
            Thumbnail::Large => "large",
            Thumbnail::Portrait => "portrait",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaUrls {
    config: Arc<MediaConfig>,
}

impl MediaUrls {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Relative URL for a stored file, `None` when nothing is stored.
    pub fn url(&self, stored: Option<&str>) -> Option<String> {
        let path = storage_path(stored?, &self.config.url_prefix)?;
        Some(format!("{}{}", self.prefix(), path))
    }

    /// Relative URL of a derived thumbnail
    pub fn thumbnail(&self, stored: Option<&str>, variant: Thumbnail) -> Option<String> {
        let path = storage_path(stored?, &self.config.url_prefix)?;
        Some(format!(
            "{}{}/{}/{}",
            self.prefix(),
            self.config.thumbnail_dir.trim_matches('/'),
            variant.dir(),
            path
        ))
    }

    fn prefix(&self) -> String {
        let trimmed = self.config.url_prefix.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }
}

impl Default for MediaUrls {
    fn default() -> Self {
        Self::new(MediaConfig::default())
    }
}

/// Reduce any stored value (relative path, absolute URL, prefixed URL) to
/// the path inside the media root.
fn storage_path<'a>(stored: &'a str, url_prefix: &str) -> Option<&'a str> {
    let stored = stored.trim();
    if stored.is_empty() {
        return None;
    }

    let without_host = match SCHEME_AND_HOST.find(stored) {
        Some(m) => &stored[m.end()..],
        None => stored,
    };

    let prefix = url_prefix.trim_matches('/');
    let path = without_host.trim_start_matches('/');
    let path = if prefix.is_empty() {
        path
    } else {
        path.strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path)
    };

    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> MediaUrls {
        MediaUrls::default()
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            urls().url(Some("images/covers/a.jpg")).as_deref(),
            Some("/media/images/covers/a.jpg")
        );
    }

    #[test]
    fn test_absolute_url_is_made_relative() {
        assert_eq!(
            urls().url(Some("https://cdn.example.com/media/images/covers/a.jpg")).as_deref(),
            Some("/media/images/covers/a.jpg")
        );
        assert_eq!(
            urls().url(Some("http://localhost:8000/books/b.pdf")).as_deref(),
            Some("/media/books/b.pdf")
        );
    }

    #[test]
    fn test_already_prefixed_value_is_not_doubled() {
        assert_eq!(
            urls().url(Some("/media/images/profiles/u.png")).as_deref(),
            Some("/media/images/profiles/u.png")
        );
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(urls().url(None), None);
        assert_eq!(urls().url(Some("")), None);
        assert_eq!(urls().thumbnail(Some("  "), Thumbnail::Small), None);
    }

    #[test]
    fn test_thumbnail_urls() {
        assert_eq!(
            urls().thumbnail(Some("images/covers/a.jpg"), Thumbnail::Medium).as_deref(),
            Some("/media/CACHE/thumbnails/medium/images/covers/a.jpg")
        );
        assert_eq!(
            urls().thumbnail(Some("https://x.org/media/p.jpg"), Thumbnail::Portrait).as_deref(),
            Some("/media/CACHE/thumbnails/portrait/p.jpg")
        );
    }

    #[test]
    fn test_custom_prefix() {
        let urls = MediaUrls::new(MediaConfig {
            url_prefix: "files".to_string(),
            thumbnail_dir: "/thumbs/".to_string(),
        });
        assert_eq!(urls.url(Some("a.png")).as_deref(), Some("/files/a.png"));
        assert_eq!(
            urls.thumbnail(Some("a.png"), Thumbnail::Large).as_deref(),
            Some("/files/thumbs/large/a.png")
        );
    }
}
