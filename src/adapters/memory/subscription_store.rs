//! In-memory subscription store for testing.
//!
//! Provides deterministic, lock-based storage for unit and integration tests.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are
//! poisoned. Production code should use the PostgreSQL store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::billing::{IdentityLink, PendingCheckoutSession, PendingSessionFilter};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::SubscriptionStore;

/// In-memory subscription store for testing.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    links: RwLock<HashMap<i64, IdentityLink>>,
    pending: RwLock<HashMap<i64, PendingCheckoutSession>>,
}

impl InMemorySubscriptionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an identity link (for test setup).
    pub fn with_link(self, link: IdentityLink) -> Self {
        self.links
            .write()
            .expect("InMemorySubscriptionStore: links lock poisoned")
            .insert(link.user_id.as_i64(), link);
        self
    }

    /// Seeds a pending session (for test setup).
    pub fn with_pending(self, session: PendingCheckoutSession) -> Self {
        self.pending
            .write()
            .expect("InMemorySubscriptionStore: pending lock poisoned")
            .insert(session.user_id.as_i64(), session);
        self
    }

    /// Returns the current identity link for a user (for test assertions).
    pub fn link(&self, user_id: UserId) -> Option<IdentityLink> {
        self.links
            .read()
            .expect("InMemorySubscriptionStore: links lock poisoned")
            .get(&user_id.as_i64())
            .cloned()
    }

    /// Returns the current pending session for a user (for test assertions).
    pub fn pending(&self, user_id: UserId) -> Option<PendingCheckoutSession> {
        self.pending
            .read()
            .expect("InMemorySubscriptionStore: pending lock poisoned")
            .get(&user_id.as_i64())
            .cloned()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn find_identity_link(&self, user_id: UserId) -> Result<Option<IdentityLink>, DomainError> {
        Ok(self.link(user_id))
    }

    async fn insert_identity_link(&self, link: &IdentityLink) -> Result<(), DomainError> {
        let mut links = self
            .links
            .write()
            .expect("InMemorySubscriptionStore: links lock poisoned");

        if links.contains_key(&link.user_id.as_i64()) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "User already has an identity link",
            ));
        }

        links.insert(link.user_id.as_i64(), link.clone());
        Ok(())
    }

    async fn set_subscription_id(
        &self,
        user_id: UserId,
        subscription_id: Option<String>,
    ) -> Result<(), DomainError> {
        let mut links = self
            .links
            .write()
            .expect("InMemorySubscriptionStore: links lock poisoned");

        let link = links.get_mut(&user_id.as_i64()).ok_or_else(|| {
            DomainError::new(ErrorCode::IdentityLinkNotFound, "Identity link not found")
        })?;

        link.subscription_id = subscription_id;
        Ok(())
    }

    async fn delete_identity_link(&self, user_id: UserId) -> Result<(), DomainError> {
        self.links
            .write()
            .expect("InMemorySubscriptionStore: links lock poisoned")
            .remove(&user_id.as_i64());
        Ok(())
    }

    async fn find_pending_session(
        &self,
        user_id: UserId,
    ) -> Result<Option<PendingCheckoutSession>, DomainError> {
        Ok(self.pending(user_id))
    }

    async fn insert_pending_session(
        &self,
        session: &PendingCheckoutSession,
    ) -> Result<(), DomainError> {
        self.pending
            .write()
            .expect("InMemorySubscriptionStore: pending lock poisoned")
            .insert(session.user_id.as_i64(), session.clone());
        Ok(())
    }

    async fn delete_pending_session(
        &self,
        user_id: UserId,
        filter: &PendingSessionFilter,
    ) -> Result<(), DomainError> {
        let mut pending = self
            .pending
            .write()
            .expect("InMemorySubscriptionStore: pending lock poisoned");

        if let Some(session) = pending.get(&user_id.as_i64()) {
            if filter.matches(session) {
                pending.remove(&user_id.as_i64());
            }
        }
        Ok(())
    }
}
