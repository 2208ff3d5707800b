//! Subscription store port (write side).
//!
//! Defines the contract for persisting the customer identity links and
//! pending checkout sessions that tie host users to provider-side state.
//!
//! # Design
//!
//! - **Keyed by user**: At most one identity link and one pending
//!   checkout session per host user
//! - **No aggregates**: Both records are flat rows; reconciliation logic
//!   lives in the domain layer, not here

use async_trait::async_trait;

use crate::domain::billing::{IdentityLink, PendingCheckoutSession, PendingSessionFilter};
use crate::domain::foundation::{DomainError, UserId};

/// Store port for identity links and pending checkout sessions.
///
/// Implementations must ensure the one-row-per-user constraint for both
/// record kinds.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Find the identity link for a user.
    ///
    /// Returns `None` if the user has never been introduced to the
    /// payment provider.
    async fn find_identity_link(&self, user_id: UserId)
        -> Result<Option<IdentityLink>, DomainError>;

    /// Insert a new identity link.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the user already has a link
    /// - `DatabaseError` on persistence failure
    async fn insert_identity_link(&self, link: &IdentityLink) -> Result<(), DomainError>;

    /// Set (or clear) the subscription ID on an existing identity link.
    ///
    /// # Errors
    ///
    /// - `IdentityLinkNotFound` if the user has no link
    /// - `DatabaseError` on persistence failure
    async fn set_subscription_id(
        &self,
        user_id: UserId,
        subscription_id: Option<String>,
    ) -> Result<(), DomainError>;

    /// Delete the identity link for a user. No-op if absent.
    async fn delete_identity_link(&self, user_id: UserId) -> Result<(), DomainError>;

    /// Find the pending checkout session for a user.
    async fn find_pending_session(
        &self,
        user_id: UserId,
    ) -> Result<Option<PendingCheckoutSession>, DomainError>;

    /// Insert a pending checkout session, replacing any existing row for
    /// the same user.
    async fn insert_pending_session(
        &self,
        session: &PendingCheckoutSession,
    ) -> Result<(), DomainError>;

    /// Delete the user's pending checkout session if it matches the
    /// filter. No-op if absent or not matching.
    async fn delete_pending_session(
        &self,
        user_id: UserId,
        filter: &PendingSessionFilter,
    ) -> Result<(), DomainError>;
}
