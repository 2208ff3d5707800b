//! Subscription quantity (seat count) update handler.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};
use crate::ports::{PaymentProvider, SubscriptionStore};

/// Command to change the seat count on a subscription.
#[derive(Debug, Clone, Copy)]
pub struct UpdateQuantityCommand {
    pub user_id: UserId,
    pub quantity: u32,
}

/// Outcome of a quantity update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityOutcome {
    Updated { quantity: u32 },
    Rejected { message: String },
}

/// Handler for seat-count changes.
pub struct UpdateQuantityHandler {
    store: Arc<dyn SubscriptionStore>,
    provider: Arc<dyn PaymentProvider>,
}

impl UpdateQuantityHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { store, provider }
    }

    pub async fn handle(
        &self,
        command: UpdateQuantityCommand,
    ) -> Result<QuantityOutcome, DomainError> {
        if command.quantity == 0 {
            return Err(ValidationError::invalid_format("quantity", "must be at least 1").into());
        }

        let link = self.store.find_identity_link(command.user_id).await?;

        let Some(subscription_id) = link.and_then(|l| l.subscription_id) else {
            return Ok(QuantityOutcome::Rejected {
                message: "No active subscription.".to_string(),
            });
        };

        let updated = self
            .provider
            .update_subscription_quantity(&subscription_id, command.quantity)
            .await
            .map_err(|e| DomainError::new(ErrorCode::PaymentProviderError, e.message))?;

        tracing::info!(
            user_id = command.user_id.as_i64(),
            subscription_id = %subscription_id,
            quantity = updated.quantity,
            "Subscription quantity updated"
        );

        Ok(QuantityOutcome::Updated {
            quantity: updated.quantity,
        })
    }
}
