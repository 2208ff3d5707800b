//! Subscription data query handler.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{PaymentProvider, SubscriptionStore, Subscription};

/// Query for a user's current subscription as the provider sees it.
#[derive(Debug, Clone, Copy)]
pub struct GetSubscriptionDataQuery {
    pub user_id: UserId,
}

/// Handler for subscription data queries.
pub struct GetSubscriptionDataHandler {
    store: Arc<dyn SubscriptionStore>,
    provider: Arc<dyn PaymentProvider>,
}

impl GetSubscriptionDataHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { store, provider }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionDataQuery,
    ) -> Result<Option<Subscription>, DomainError> {
        let link = self.store.find_identity_link(query.user_id).await?;

        let Some(subscription_id) = link.and_then(|l| l.subscription_id) else {
            return Ok(None);
        };

        self.provider
            .get_subscription(&subscription_id)
            .await
            .map_err(|e| DomainError::new(ErrorCode::PaymentProviderError, e.message))
    }
}
