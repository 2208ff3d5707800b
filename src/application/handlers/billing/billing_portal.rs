//! Billing portal session handler.
//!
//! Hands the customer a provider-hosted portal URL for self-service
//! invoice history and payment-method management.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{PaymentProvider, SubscriptionStore};

/// Command to open a billing portal session.
#[derive(Debug, Clone)]
pub struct BillingPortalCommand {
    pub user_id: UserId,

    /// Where the portal sends the customer back afterwards.
    pub return_url: String,
}

/// Outcome of a portal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalOutcome {
    Redirect { url: String },
    Rejected { message: String },
}

/// Handler for billing portal sessions.
pub struct BillingPortalHandler {
    store: Arc<dyn SubscriptionStore>,
    provider: Arc<dyn PaymentProvider>,
}

impl BillingPortalHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { store, provider }
    }

    pub async fn handle(&self, command: BillingPortalCommand) -> Result<PortalOutcome, DomainError> {
        let link = self.store.find_identity_link(command.user_id).await?;

        let Some(customer_id) = link.and_then(|l| l.customer_id) else {
            return Ok(PortalOutcome::Rejected {
                message: "No billing information on file.".to_string(),
            });
        };

        let session = self
            .provider
            .create_portal_session(&customer_id, &command.return_url)
            .await
            .map_err(|e| DomainError::new(ErrorCode::PaymentProviderError, e.message))?;

        Ok(PortalOutcome::Redirect { url: session.url })
    }
}
