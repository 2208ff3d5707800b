//! Checkout initiation handler.
//!
//! Starts a hosted checkout for a (product, payment term) pair. First-time
//! buyers get a provider customer and an identity link; returning customers
//! reuse theirs. A pending-session row records what checkout was started so
//! the webhook reconciler can clear it later.

use std::sync::Arc;

use crate::domain::billing::{
    is_defunct, CatalogCache, IdentityLink, PendingCheckoutSession, PendingSessionFilter,
    META_PAYMENT_TERM, META_PRODUCT_ID, META_USER_ID,
};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{
    CreateCheckoutRequest, CreateCustomerRequest, PaymentProvider, SubscriptionStore,
    UserDirectory,
};

/// Command to start a checkout session.
#[derive(Debug, Clone)]
pub struct InitiateCheckoutCommand {
    pub user_id: UserId,
    pub product_id: String,
    pub payment_term: String,
    pub quantity: u32,
}

/// Outcome of checkout initiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Session created; redirect the customer to the hosted checkout page.
    Redirect { session_id: String, url: String },

    /// Precondition failed; message is shown to the customer as-is.
    Rejected { message: String },
}

/// Handler for checkout initiation.
pub struct InitiateCheckoutHandler {
    store: Arc<dyn SubscriptionStore>,
    users: Arc<dyn UserDirectory>,
    provider: Arc<dyn PaymentProvider>,
    catalog: Arc<CatalogCache>,
}

impl InitiateCheckoutHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        users: Arc<dyn UserDirectory>,
        provider: Arc<dyn PaymentProvider>,
        catalog: Arc<CatalogCache>,
    ) -> Self {
        Self {
            store,
            users,
            provider,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        command: InitiateCheckoutCommand,
    ) -> Result<CheckoutOutcome, DomainError> {
        let existing_link = self.store.find_identity_link(command.user_id).await?;

        // Purchase-flow check before any catalog lookup: a live subscription
        // blocks a fresh purchase.
        if let Some(link) = &existing_link {
            if let Some(subscription_id) = &link.subscription_id {
                let held = self
                    .provider
                    .get_subscription(subscription_id)
                    .await
                    .map_err(provider_error)?;

                if let Some(subscription) = held {
                    if !is_defunct(&subscription.status) {
                        return Ok(CheckoutOutcome::Rejected {
                            message:
                                "You already have a subscription. Use upgrade or the billing portal to change it."
                                    .to_string(),
                        });
                    }
                }
            }
        }

        let catalog = self.catalog.get().await.map_err(provider_error)?;

        if catalog.product(&command.product_id).is_none() {
            return Ok(CheckoutOutcome::Rejected {
                message: "Unknown product ID.".to_string(),
            });
        }

        let Some(pricing) = catalog.pricing(&command.product_id, &command.payment_term) else {
            return Ok(CheckoutOutcome::Rejected {
                message: "Unknown payment term.".to_string(),
            });
        };

        let customer_id = self.resolve_customer(command.user_id, &existing_link).await?;

        let metadata = std::collections::HashMap::from([
            (META_USER_ID.to_string(), command.user_id.to_string()),
            (META_PRODUCT_ID.to_string(), command.product_id.clone()),
            (META_PAYMENT_TERM.to_string(), command.payment_term.clone()),
        ]);

        let session = self
            .provider
            .create_checkout_session(CreateCheckoutRequest {
                customer_id,
                price_id: pricing.price_id.clone(),
                quantity: command.quantity,
                trial_period_days: pricing.trial_period_days,
                subscription_metadata: metadata,
                success_url: pricing.success_url.clone(),
                cancel_url: pricing.cancel_url.clone(),
            })
            .await
            .map_err(provider_error)?;

        // One pending session per user: any prior one is superseded.
        self.store
            .delete_pending_session(command.user_id, &PendingSessionFilter::any())
            .await?;
        self.store
            .insert_pending_session(&PendingCheckoutSession {
                user_id: command.user_id,
                session_id: session.id.clone(),
                product_id: command.product_id,
                payment_term: command.payment_term,
                quantity: command.quantity,
            })
            .await?;

        tracing::info!(
            user_id = command.user_id.as_i64(),
            session_id = %session.id,
            "Checkout session created"
        );

        Ok(CheckoutOutcome::Redirect {
            session_id: session.id,
            url: session.url,
        })
    }

    /// Returns the provider customer for the user, creating one (and the
    /// identity link) on first purchase.
    async fn resolve_customer(
        &self,
        user_id: UserId,
        existing_link: &Option<IdentityLink>,
    ) -> Result<String, DomainError> {
        if let Some(link) = existing_link {
            if let Some(customer_id) = &link.customer_id {
                return Ok(customer_id.clone());
            }

            // Link without a customer cannot be repaired in place; replace it.
            self.store.delete_identity_link(user_id).await?;
        }

        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"))?;

        let customer = self
            .provider
            .create_customer(CreateCustomerRequest {
                user_id,
                email: user.email,
                name: user.display_name,
            })
            .await
            .map_err(provider_error)?;

        self.store
            .insert_identity_link(&IdentityLink {
                user_id,
                customer_id: Some(customer.id.clone()),
                subscription_id: None,
            })
            .await?;

        Ok(customer.id)
    }
}

fn provider_error(e: crate::ports::PaymentError) -> DomainError {
    DomainError::new(ErrorCode::PaymentProviderError, e.message)
}
