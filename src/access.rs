//! Ownership and visibility rules.
//!
//! Every handler resolves a [`Caller`] and asks [`authorize`] before touching
//! an entity. The rules are pure functions of the caller, the entity's
//! owner/visibility and the action, so they read the same for every
//! transport.

use crate::error::{AppError, AppResult};

/// Resolved identity of the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(i64),
}

impl Caller {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::User(_))
    }

    /// User id, or Unauthorized for anonymous callers
    pub fn require_user(&self) -> AppResult<i64> {
        self.user_id()
            .ok_or_else(|| AppError::Authentication("Authentication credentials were not provided".to_string()))
    }

    fn owns(&self, owner: Option<i64>) -> bool {
        matches!((self, owner), (Caller::User(id), Some(owner)) if *id == owner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

/// What the rules need to know about the entity being touched.
///
/// For `Create` the owner fields of standalone entities are ignored; a
/// `ListItem` carries its parent list since that is what gates creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Book, Author, Publisher, Tag
    Catalog { owner: Option<i64> },
    Note { owner: i64 },
    List { owner: Option<i64>, is_public: bool },
    ListItem { list_owner: Option<i64>, list_is_public: bool },
    BookCard { owner: i64 },
}

impl Resource {
    fn kind(&self) -> &'static str {
        match self {
            Resource::Catalog { .. } => "entry",
            Resource::Note { .. } => "note",
            Resource::List { .. } => "list",
            Resource::ListItem { .. } => "list item",
            Resource::BookCard { .. } => "book card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No valid credentials where they are required
    Unauthenticated,
    /// Authenticated (or anonymous on a visibility check) but not allowed
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Map a denial to the error surfaced to the client
    pub fn into_result(self, resource: &Resource, action: Action) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(Denial::Unauthenticated) => Err(AppError::Authentication(
                "Authentication credentials were not provided".to_string(),
            )),
            Decision::Deny(Denial::Forbidden) => Err(AppError::Authorization(format!(
                "You do not have permission to {} this {}",
                match action {
                    Action::Read => "read",
                    Action::Create => "add to",
                    Action::Update => "change",
                    Action::Delete => "delete",
                },
                resource.kind()
            ))),
        }
    }

    fn from_bool(allowed: bool, denial: Denial) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny(denial)
        }
    }
}

/// Decide whether `caller` may perform `action` on `resource`.
pub fn authorize(caller: Caller, resource: &Resource, action: Action) -> Decision {
    use Action::*;

    // Writes always need an identity; this check precedes any ownership test.
    if action != Read && !caller.is_authenticated() {
        return Decision::Deny(Denial::Unauthenticated);
    }

    match (*resource, action) {
        (Resource::Catalog { .. }, Read) => Decision::Allow,
        (Resource::Catalog { .. }, Create) => Decision::Allow,
        (Resource::Catalog { owner }, Update | Delete) => {
            Decision::from_bool(caller.owns(owner), Denial::Forbidden)
        }

        (Resource::Note { .. }, Create) | (Resource::BookCard { .. }, Create) => Decision::Allow,
        (Resource::Note { owner }, _) | (Resource::BookCard { owner }, _) => {
            if !caller.is_authenticated() {
                Decision::Deny(Denial::Unauthenticated)
            } else {
                Decision::from_bool(caller.owns(Some(owner)), Denial::Forbidden)
            }
        }

        (Resource::List { owner, is_public }, Read) => {
            Decision::from_bool(is_public || caller.owns(owner), Denial::Forbidden)
        }
        (Resource::List { .. }, Create) => Decision::Allow,
        (Resource::List { owner, .. }, Update | Delete) => {
            Decision::from_bool(caller.owns(owner), Denial::Forbidden)
        }

        (Resource::ListItem { list_owner, list_is_public }, Read) => {
            Decision::from_bool(list_is_public || caller.owns(list_owner), Denial::Forbidden)
        }
        (Resource::ListItem { list_owner, .. }, Create | Update | Delete) => {
            Decision::from_bool(caller.owns(list_owner), Denial::Forbidden)
        }
    }
}

/// [`authorize`] as a result, logging denials.
pub fn ensure(caller: Caller, resource: &Resource, action: Action) -> AppResult<()> {
    let decision = authorize(caller, resource, action);
    if decision == Decision::Deny(Denial::Forbidden) {
        tracing::warn!(?caller, ?action, resource = resource.kind(), "Access denied");
    }
    decision.into_result(resource, action)
}

/// A create payload with its owner forced to the caller.
#[derive(Debug, Clone)]
pub struct Stamped<T> {
    pub owner_id: i64,
    pub payload: T,
}

/// Attach the caller as owner of a new entity.
///
/// Payload types carry no owner field, so whatever a client submitted as
/// `user` never reaches the store.
pub fn stamp_owner<T>(caller: Caller, payload: T) -> AppResult<Stamped<T>> {
    let owner_id = caller.require_user()?;
    Ok(Stamped { owner_id, payload })
}

/// Which lists a listing request may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    PublicOnly,
    PublicOrOwnedBy(i64),
    OwnedBy(i64),
}

pub fn visible_lists(caller: Caller, only_own_lists: bool) -> AppResult<ListScope> {
    match (caller, only_own_lists) {
        (Caller::Anonymous, false) => Ok(ListScope::PublicOnly),
        (Caller::Anonymous, true) => Err(AppError::Authentication(
            "Authentication credentials were not provided".to_string(),
        )),
        (Caller::User(id), false) => Ok(ListScope::PublicOrOwnedBy(id)),
        (Caller::User(id), true) => Ok(ListScope::OwnedBy(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: i64 = 1;
    const OTHER: i64 = 2;

    const ANON: Caller = Caller::Anonymous;
    const ME: Caller = Caller::User(OWNER);
    const THEM: Caller = Caller::User(OTHER);

    const UNAUTH: Decision = Decision::Deny(Denial::Unauthenticated);
    const FORBID: Decision = Decision::Deny(Denial::Forbidden);

    #[test]
    fn test_catalog_rules() {
        let book = Resource::Catalog { owner: Some(OWNER) };

        assert_eq!(authorize(ANON, &book, Action::Read), Decision::Allow);
        assert_eq!(authorize(THEM, &book, Action::Read), Decision::Allow);

        assert_eq!(authorize(ANON, &book, Action::Create), UNAUTH);
        assert_eq!(authorize(THEM, &book, Action::Create), Decision::Allow);

        for action in [Action::Update, Action::Delete] {
            assert_eq!(authorize(ANON, &book, action), UNAUTH);
            assert_eq!(authorize(THEM, &book, action), FORBID);
            assert_eq!(authorize(ME, &book, action), Decision::Allow);
        }
    }

    #[test]
    fn test_unowned_catalog_entry_is_read_only() {
        let seeded = Resource::Catalog { owner: None };
        assert!(authorize(ME, &seeded, Action::Read).is_allowed());
        assert_eq!(authorize(ME, &seeded, Action::Update), FORBID);
        assert_eq!(authorize(ME, &seeded, Action::Delete), FORBID);
    }

    #[test]
    fn test_note_is_owner_only() {
        let note = Resource::Note { owner: OWNER };

        assert_eq!(authorize(ANON, &note, Action::Read), UNAUTH);
        assert_eq!(authorize(THEM, &note, Action::Read), FORBID);
        assert_eq!(authorize(ME, &note, Action::Read), Decision::Allow);
        assert_eq!(authorize(THEM, &note, Action::Update), FORBID);
        assert_eq!(authorize(THEM, &note, Action::Delete), FORBID);
        assert_eq!(authorize(ME, &note, Action::Delete), Decision::Allow);
        assert_eq!(authorize(ANON, &note, Action::Create), UNAUTH);
        assert_eq!(authorize(THEM, &note, Action::Create), Decision::Allow);
    }

    #[test]
    fn test_book_card_is_owner_only() {
        let card = Resource::BookCard { owner: OWNER };
        assert_eq!(authorize(ANON, &card, Action::Read), UNAUTH);
        assert_eq!(authorize(THEM, &card, Action::Read), FORBID);
        assert_eq!(authorize(ME, &card, Action::Update), Decision::Allow);
    }

    #[test]
    fn test_private_list_read() {
        let private = Resource::List { owner: Some(OWNER), is_public: false };

        // anonymous gets Forbidden, not Unauthorized
        assert_eq!(authorize(ANON, &private, Action::Read), FORBID);
        assert_eq!(authorize(THEM, &private, Action::Read), FORBID);
        assert_eq!(authorize(ME, &private, Action::Read), Decision::Allow);
    }

    #[test]
    fn test_public_list_rules() {
        let public = Resource::List { owner: Some(OWNER), is_public: true };

        assert_eq!(authorize(ANON, &public, Action::Read), Decision::Allow);
        assert_eq!(authorize(THEM, &public, Action::Read), Decision::Allow);
        assert_eq!(authorize(ANON, &public, Action::Delete), UNAUTH);
        assert_eq!(authorize(THEM, &public, Action::Delete), FORBID);
        assert_eq!(authorize(ME, &public, Action::Delete), Decision::Allow);
    }

    #[test]
    fn test_curated_list_cannot_be_changed() {
        let curated = Resource::List { owner: None, is_public: true };
        assert!(authorize(ANON, &curated, Action::Read).is_allowed());
        assert_eq!(authorize(ME, &curated, Action::Update), FORBID);
    }

    #[test]
    fn test_list_item_follows_parent_list() {
        let in_private = Resource::ListItem { list_owner: Some(OWNER), list_is_public: false };
        let in_public = Resource::ListItem { list_owner: Some(OWNER), list_is_public: true };

        assert_eq!(authorize(ANON, &in_private, Action::Read), FORBID);
        assert_eq!(authorize(ME, &in_private, Action::Read), Decision::Allow);
        assert_eq!(authorize(ANON, &in_public, Action::Read), Decision::Allow);

        // creating needs ownership of the parent list, even a public one
        assert_eq!(authorize(ANON, &in_public, Action::Create), UNAUTH);
        assert_eq!(authorize(THEM, &in_public, Action::Create), FORBID);
        assert_eq!(authorize(ME, &in_public, Action::Create), Decision::Allow);

        assert_eq!(authorize(THEM, &in_public, Action::Delete), FORBID);
        assert_eq!(authorize(ME, &in_private, Action::Update), Decision::Allow);
    }

    #[test]
    fn test_ensure_maps_to_errors() {
        let private = Resource::List { owner: Some(OWNER), is_public: false };
        assert!(matches!(
            ensure(ANON, &private, Action::Read),
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            ensure(ANON, &private, Action::Delete),
            Err(AppError::Authentication(_))
        ));
        assert!(ensure(ME, &private, Action::Delete).is_ok());
    }

    #[test]
    fn test_stamp_owner_uses_caller() {
        #[derive(Debug)]
        struct Payload {
            title: &'static str,
        }

        let stamped = stamp_owner(THEM, Payload { title: "x" }).unwrap();
        assert_eq!(stamped.owner_id, OTHER);
        assert_eq!(stamped.payload.title, "x");

        assert!(matches!(
            stamp_owner(ANON, Payload { title: "x" }),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_visible_lists_scope() {
        assert_eq!(visible_lists(ANON, false).unwrap(), ListScope::PublicOnly);
        assert!(visible_lists(ANON, true).is_err());
        assert_eq!(visible_lists(ME, false).unwrap(), ListScope::PublicOrOwnedBy(OWNER));
        assert_eq!(visible_lists(ME, true).unwrap(), ListScope::OwnedBy(OWNER));
    }
}
