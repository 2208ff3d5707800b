//! Pending checkout transaction handler.
//!
//! A pending row means a checkout was started but its outcome has not yet
//! arrived over the webhook channel. The host surfaces this on the account
//! page and may clear it explicitly, which also expires the open checkout
//! session at the provider (best effort).

use std::sync::Arc;

use crate::domain::billing::{PendingCheckoutSession, PendingSessionFilter};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{PaymentProvider, SubscriptionStore};

/// Handler for pending-transaction checks and clears.
pub struct PendingTransactionHandler {
    store: Arc<dyn SubscriptionStore>,
    provider: Arc<dyn PaymentProvider>,
}

impl PendingTransactionHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { store, provider }
    }

    /// Returns the pending checkout for a user, if one exists.
    pub async fn check(
        &self,
        user_id: UserId,
    ) -> Result<Option<PendingCheckoutSession>, DomainError> {
        self.store.find_pending_session(user_id).await
    }

    /// Clears the user's pending checkout, expiring the open provider
    /// session so the stale payment link stops working.
    pub async fn clear(&self, user_id: UserId) -> Result<(), DomainError> {
        let Some(pending) = self.store.find_pending_session(user_id).await? else {
            return Ok(());
        };

        if let Err(e) = self.provider.expire_checkout_session(&pending.session_id).await {
            // Already-completed or already-expired sessions fail here; the
            // local row still goes away.
            tracing::warn!(
                session_id = %pending.session_id,
                error = %e,
                "Could not expire checkout session"
            );
        }

        self.store
            .delete_pending_session(user_id, &PendingSessionFilter::any())
            .await?;

        Ok(())
    }
}
