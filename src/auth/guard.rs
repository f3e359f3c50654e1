/// Ownership guard applied before every entity access
///
/// A missing entity and an entity owned by someone else produce the same
/// `NotFoundOrAccessDenied` error, parameterized only by entity kind.

use crate::auth::Caller;
use crate::error::{EntityKind, Result, WorkspaceError};
use crate::workspace::types::{Item, Page, View};

/// Entities that carry an owner
pub trait Owned {
    const KIND: EntityKind;

    fn owner_id(&self) -> &str;
}

impl Owned for Page {
    const KIND: EntityKind = EntityKind::Page;

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl Owned for Item {
    const KIND: EntityKind = EntityKind::Item;

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl Owned for View {
    const KIND: EntityKind = EntityKind::View;

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

/// Per-request authorization checks for one caller
#[derive(Debug, Clone, Copy)]
pub struct Guard<'a> {
    caller: &'a Caller,
}

impl<'a> Guard<'a> {
    pub fn new(caller: &'a Caller) -> Self {
        Self { caller }
    }

    /// Require an authenticated caller
    pub fn user(&self) -> Result<&'a str> {
        self.caller.user_id().ok_or(WorkspaceError::NotAuthenticated)
    }

    /// Require the entity to exist and belong to the caller
    pub fn owned<E: Owned>(&self, entity: Option<E>) -> Result<E> {
        let user = self.user()?;
        match entity {
            Some(entity) if entity.owner_id() == user => Ok(entity),
            _ => {
                tracing::warn!("🚫 {} access denied for user {}", E::KIND, user);
                Err(WorkspaceError::NotFoundOrAccessDenied { kind: E::KIND })
            }
        }
    }

    /// Require the page to exist, belong to the caller and be a database
    pub fn database(&self, page: Option<Page>) -> Result<Page> {
        let denied = WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::Database };
        let page = self.owned(page).map_err(|e| match e {
            WorkspaceError::NotFoundOrAccessDenied { .. } => denied,
            other => other,
        })?;

        if !page.is_database() {
            tracing::warn!("🚫 Page {} is not a database", page.id);
            return Err(WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::Database });
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::types::PageType;

    fn page(owner: &str, page_type: PageType) -> Page {
        Page {
            id: "p1".into(),
            title: "Tasks".into(),
            parent_id: None,
            owner_id: owner.into(),
            page_type,
            schema: Vec::new(),
        }
    }

    #[test]
    fn anonymous_callers_are_rejected() {
        let caller = Caller::anonymous();
        let guard = Guard::new(&caller);
        assert!(matches!(guard.user(), Err(WorkspaceError::NotAuthenticated)));
        assert!(matches!(
            guard.owned(Some(page("alice", PageType::Database))),
            Err(WorkspaceError::NotAuthenticated)
        ));
    }

    #[test]
    fn missing_and_foreign_entities_look_the_same() {
        let caller = Caller::user("bob");
        let guard = Guard::new(&caller);

        let missing = guard.owned::<Page>(None).unwrap_err();
        let foreign = guard.owned(Some(page("alice", PageType::Database))).unwrap_err();
        assert_eq!(missing.to_string(), foreign.to_string());
    }

    #[test]
    fn database_checks_page_type() {
        let caller = Caller::user("alice");
        let guard = Guard::new(&caller);

        assert!(guard.database(Some(page("alice", PageType::Database))).is_ok());
        assert!(matches!(
            guard.database(Some(page("alice", PageType::Document))),
            Err(WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::Database })
        ));
        assert!(matches!(
            guard.database(Some(page("carol", PageType::Database))),
            Err(WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::Database })
        ));
    }
}
