//! Customer deletion cascade handler.
//!
//! Runs when the host deletes a user account: the external customer is
//! removed at the provider (which also ends any subscription there), then
//! the identity link and any pending checkout session are dropped locally.

use std::sync::Arc;

use crate::domain::billing::PendingSessionFilter;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{PaymentProvider, SubscriptionStore};

/// Command fired when a host user account is deleted.
#[derive(Debug, Clone, Copy)]
pub struct DeleteCustomerCommand {
    pub user_id: UserId,
}

/// Handler for the user-deletion cascade.
pub struct DeleteCustomerHandler {
    store: Arc<dyn SubscriptionStore>,
    provider: Arc<dyn PaymentProvider>,
}

impl DeleteCustomerHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { store, provider }
    }

    pub async fn handle(&self, command: DeleteCustomerCommand) -> Result<(), DomainError> {
        let link = self.store.find_identity_link(command.user_id).await?;

        if let Some(customer_id) = link.as_ref().and_then(|l| l.customer_id.as_deref()) {
            self.provider
                .delete_customer(customer_id)
                .await
                .map_err(|e| DomainError::new(ErrorCode::PaymentProviderError, e.message))?;
        }

        if link.is_some() {
            self.store.delete_identity_link(command.user_id).await?;
        }

        self.store
            .delete_pending_session(command.user_id, &PendingSessionFilter::any())
            .await?;

        tracing::info!(user_id = command.user_id.as_i64(), "Billing records removed for user");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::billing::{IdentityLink, PendingCheckoutSession};
    use crate::ports::PaymentError;

    #[tokio::test]
    async fn deletes_customer_link_and_pending_session() {
        let provider = MockPaymentProvider::with_active_subscription("cus_1", "sub_1");
        let store = Arc::new(
            InMemorySubscriptionStore::new()
                .with_link(IdentityLink {
                    user_id: UserId::new(1).unwrap(),
                    customer_id: Some("cus_1".to_string()),
                    subscription_id: Some("sub_1".to_string()),
                })
                .with_pending(PendingCheckoutSession {
                    user_id: UserId::new(1).unwrap(),
                    session_id: "cs_1".to_string(),
                    product_id: "speedsentry".to_string(),
                    payment_term: "monthly".to_string(),
                    quantity: 1,
                }),
        );

        let handler = DeleteCustomerHandler::new(
            Arc::clone(&store) as Arc<dyn SubscriptionStore>,
            Arc::new(provider.clone()),
        );

        handler
            .handle(DeleteCustomerCommand {
                user_id: UserId::new(1).unwrap(),
            })
            .await
            .unwrap();

        assert!(provider.was_called("delete_customer"));
        assert!(store.link(UserId::new(1).unwrap()).is_none());
        assert!(store.pending(UserId::new(1).unwrap()).is_none());
    }

    #[tokio::test]
    async fn no_link_is_a_quiet_no_op() {
        let provider = MockPaymentProvider::new();
        let handler = DeleteCustomerHandler::new(
            Arc::new(InMemorySubscriptionStore::new()),
            Arc::new(provider.clone()),
        );

        handler
            .handle(DeleteCustomerCommand {
                user_id: UserId::new(9).unwrap(),
            })
            .await
            .unwrap();

        assert!(!provider.was_called("delete_customer"));
    }

    #[tokio::test]
    async fn provider_failure_keeps_local_records() {
        let provider = MockPaymentProvider::with_active_subscription("cus_1", "sub_1");
        provider.set_method_error("delete_customer", PaymentError::network("down"));

        let store = Arc::new(InMemorySubscriptionStore::new().with_link(IdentityLink {
            user_id: UserId::new(1).unwrap(),
            customer_id: Some("cus_1".to_string()),
            subscription_id: None,
        }));

        let handler = DeleteCustomerHandler::new(
            Arc::clone(&store) as Arc<dyn SubscriptionStore>,
            Arc::new(provider),
        );

        let result = handler
            .handle(DeleteCustomerCommand {
                user_id: UserId::new(1).unwrap(),
            })
            .await;

        assert!(result.is_err());
        assert!(store.link(UserId::new(1).unwrap()).is_some());
    }
}
