//! Host-initiated subscription cancellation handler.
//!
//! Cancels the provider subscription immediately and clears the link's
//! subscription id. The link row itself survives so the customer can
//! purchase again later.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{PaymentProvider, SubscriptionStore};

/// Command to cancel a user's subscription.
#[derive(Debug, Clone, Copy)]
pub struct CancelSubscriptionCommand {
    pub user_id: UserId,
}

/// Outcome of a cancellation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Canceled,
    Rejected { message: String },
}

/// Handler for host-initiated cancellation.
pub struct CancelSubscriptionHandler {
    store: Arc<dyn SubscriptionStore>,
    provider: Arc<dyn PaymentProvider>,
}

impl CancelSubscriptionHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { store, provider }
    }

    pub async fn handle(
        &self,
        command: CancelSubscriptionCommand,
    ) -> Result<CancelOutcome, DomainError> {
        let link = self.store.find_identity_link(command.user_id).await?;

        let Some(subscription_id) = link.and_then(|l| l.subscription_id) else {
            return Ok(CancelOutcome::Rejected {
                message: "No active subscription.".to_string(),
            });
        };

        self.provider
            .cancel_subscription(&subscription_id)
            .await
            .map_err(|e| DomainError::new(ErrorCode::PaymentProviderError, e.message))?;

        // Keep the link row; only the subscription reference is cleared.
        self.store
            .set_subscription_id(command.user_id, None)
            .await?;

        tracing::info!(
            user_id = command.user_id.as_i64(),
            subscription_id = %subscription_id,
            "Subscription canceled"
        );

        Ok(CancelOutcome::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::billing::IdentityLink;
    use crate::ports::PaymentError;

    fn linked_store() -> InMemorySubscriptionStore {
        InMemorySubscriptionStore::new().with_link(IdentityLink {
            user_id: UserId::new(1).unwrap(),
            customer_id: Some("cus_1".to_string()),
            subscription_id: Some("sub_1".to_string()),
        })
    }

    #[tokio::test]
    async fn cancel_clears_subscription_id_but_keeps_link() {
        let provider = MockPaymentProvider::with_active_subscription("cus_1", "sub_1");
        let store = Arc::new(linked_store());
        let handler = CancelSubscriptionHandler::new(
            Arc::clone(&store) as Arc<dyn SubscriptionStore>,
            Arc::new(provider.clone()),
        );

        let outcome = handler
            .handle(CancelSubscriptionCommand {
                user_id: UserId::new(1).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, CancelOutcome::Canceled);
        assert_eq!(provider.subscription("sub_1").unwrap().status, "canceled");

        let link = store.link(UserId::new(1).unwrap()).unwrap();
        assert!(link.subscription_id.is_none());
        assert_eq!(link.customer_id.as_deref(), Some("cus_1"));
    }

    #[tokio::test]
    async fn cancel_without_subscription_rejected() {
        let handler = CancelSubscriptionHandler::new(
            Arc::new(InMemorySubscriptionStore::new()),
            Arc::new(MockPaymentProvider::new()),
        );

        let outcome = handler
            .handle(CancelSubscriptionCommand {
                user_id: UserId::new(1).unwrap(),
            })
            .await
            .unwrap();

        assert!(matches!(outcome, CancelOutcome::Rejected { .. }));
    }

    #[tokio::test]
    async fn provider_failure_leaves_link_untouched() {
        let provider = MockPaymentProvider::with_active_subscription("cus_1", "sub_1");
        provider.set_method_error("cancel_subscription", PaymentError::network("down"));

        let store = Arc::new(linked_store());
        let handler = CancelSubscriptionHandler::new(
            Arc::clone(&store) as Arc<dyn SubscriptionStore>,
            Arc::new(provider),
        );

        let result = handler
            .handle(CancelSubscriptionCommand {
                user_id: UserId::new(1).unwrap(),
            })
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::PaymentProviderError);

        let link = store.link(UserId::new(1).unwrap()).unwrap();
        assert_eq!(link.subscription_id.as_deref(), Some("sub_1"));
    }
}
