//! Registration completion handler.
//!
//! Fired by the host once a new account is confirmed. Always emits a
//! `registration-completed` notification; when the registration carried a
//! desired (product, payment term), it also starts the first-time purchase
//! flow.

use std::sync::Arc;

use crate::domain::billing::{
    BillingNotification, CatalogCache, DomainEventEmitter, ProductCatalog,
};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{SubscriptionStore, UserDirectory};

use super::initiate_checkout::{CheckoutOutcome, InitiateCheckoutCommand, InitiateCheckoutHandler};

/// Command fired when a host account finishes registration.
#[derive(Debug, Clone)]
pub struct CompleteRegistrationCommand {
    pub user_id: UserId,

    /// Product the user selected during signup, if any.
    pub product_id: Option<String>,

    /// Payment term the user selected during signup, if any.
    pub payment_term: Option<String>,

    pub quantity: u32,
}

/// Outcome of registration completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Notification emitted; no purchase was requested.
    Completed,

    /// Notification emitted and a purchase flow was attempted.
    CompletedWithCheckout(CheckoutOutcome),
}

/// Handler for registration completion.
pub struct CompleteRegistrationHandler {
    store: Arc<dyn SubscriptionStore>,
    users: Arc<dyn UserDirectory>,
    emitter: DomainEventEmitter,
    catalog: Arc<CatalogCache>,
    checkout: Arc<InitiateCheckoutHandler>,
}

impl CompleteRegistrationHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        users: Arc<dyn UserDirectory>,
        emitter: DomainEventEmitter,
        catalog: Arc<CatalogCache>,
        checkout: Arc<InitiateCheckoutHandler>,
    ) -> Self {
        Self {
            store,
            users,
            emitter,
            catalog,
            checkout,
        }
    }

    pub async fn handle(
        &self,
        command: CompleteRegistrationCommand,
    ) -> Result<RegistrationOutcome, DomainError> {
        let user = self
            .users
            .find_user(command.user_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"))?;

        let catalog = match self.catalog.get().await {
            Ok(catalog) => catalog.clone(),
            Err(e) => {
                tracing::error!(error = %e, "Catalog unavailable during registration");
                ProductCatalog::empty()
            }
        };

        self.emitter
            .publish(BillingNotification::RegistrationCompleted {
                user,
                catalog,
            })
            .await;

        let (Some(product_id), Some(payment_term)) = (command.product_id, command.payment_term)
        else {
            return Ok(RegistrationOutcome::Completed);
        };

        if self.store.find_identity_link(command.user_id).await?.is_some() {
            return Ok(RegistrationOutcome::CompletedWithCheckout(
                CheckoutOutcome::Rejected {
                    message: "You have already purchased a subscription.".to_string(),
                },
            ));
        }

        let outcome = self
            .checkout
            .handle(InitiateCheckoutCommand {
                user_id: command.user_id,
                product_id,
                payment_term,
                quantity: command.quantity.max(1),
            })
            .await?;

        Ok(RegistrationOutcome::CompletedWithCheckout(outcome))
    }
}
