//! Subscription upgrade handler.
//!
//! Moves an active subscription to a different (product, payment term) pair.
//! Upgrades are restricted to the allow-list carried by the current price's
//! catalog entry; everything else is rejected before the provider is called.

use std::sync::Arc;

use crate::domain::billing::{
    is_active_or_trialing, CatalogCache, META_PAYMENT_TERM, META_PRODUCT_ID, META_USER_ID,
};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{PaymentProvider, SubscriptionStore, UpdateSubscriptionPriceRequest};

/// Command to upgrade a subscription in place.
#[derive(Debug, Clone)]
pub struct UpgradeSubscriptionCommand {
    pub user_id: UserId,
    pub product_id: String,
    pub payment_term: String,
}

/// Outcome of an upgrade attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The provider accepted the price change.
    Upgraded,

    /// Precondition failed; message is shown to the customer as-is.
    Rejected { message: String },
}

impl UpgradeOutcome {
    fn rejected(message: &str) -> Self {
        Self::Rejected {
            message: message.to_string(),
        }
    }
}

/// Handler for in-place subscription upgrades.
pub struct UpgradeSubscriptionHandler {
    store: Arc<dyn SubscriptionStore>,
    provider: Arc<dyn PaymentProvider>,
    catalog: Arc<CatalogCache>,
}

impl UpgradeSubscriptionHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        provider: Arc<dyn PaymentProvider>,
        catalog: Arc<CatalogCache>,
    ) -> Self {
        Self {
            store,
            provider,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        command: UpgradeSubscriptionCommand,
    ) -> Result<UpgradeOutcome, DomainError> {
        let link = self.store.find_identity_link(command.user_id).await?;

        let Some(subscription_id) = link.and_then(|l| l.subscription_id) else {
            return Ok(UpgradeOutcome::rejected(
                "No active subscription. Please purchase a new subscription.",
            ));
        };

        let subscription = self
            .provider
            .get_subscription(&subscription_id)
            .await
            .map_err(|e| DomainError::new(ErrorCode::PaymentProviderError, e.message))?;

        let Some(subscription) = subscription else {
            return Ok(UpgradeOutcome::rejected(
                "No active subscription. Please purchase a new subscription.",
            ));
        };

        if !is_active_or_trialing(&subscription.status) {
            return Ok(UpgradeOutcome::rejected(
                "You must have an active subscription to upgrade it.",
            ));
        }

        let catalog = self
            .catalog
            .get()
            .await
            .map_err(|e| DomainError::new(ErrorCode::PaymentProviderError, e.message))?;

        if catalog.product(&command.product_id).is_none() {
            return Ok(UpgradeOutcome::rejected("Unknown product ID."));
        }

        let Some(target_pricing) = catalog.pricing(&command.product_id, &command.payment_term)
        else {
            return Ok(UpgradeOutcome::rejected("Unknown payment term."));
        };

        // The allow-list lives on the price the customer currently holds.
        let current_product = subscription
            .metadata
            .get(META_PRODUCT_ID)
            .map(String::as_str)
            .unwrap_or_default();
        let current_term = subscription
            .metadata
            .get(META_PAYMENT_TERM)
            .map(String::as_str)
            .unwrap_or_default();

        let allowed = catalog
            .pricing(current_product, current_term)
            .map(|p| p.allows_upgrade_to(&command.product_id, &command.payment_term))
            .unwrap_or(false);

        if !allowed {
            return Ok(UpgradeOutcome::rejected("Not an allowed upgrade."));
        }

        let metadata = std::collections::HashMap::from([
            (META_USER_ID.to_string(), command.user_id.to_string()),
            (META_PRODUCT_ID.to_string(), command.product_id.clone()),
            (META_PAYMENT_TERM.to_string(), command.payment_term.clone()),
        ]);

        let updated = self
            .provider
            .update_subscription_price(UpdateSubscriptionPriceRequest {
                subscription_id: subscription.id.clone(),
                item_id: subscription.item_id,
                price_id: target_pricing.price_id.clone(),
                metadata,
            })
            .await;

        match updated {
            Ok(_) => {
                tracing::info!(
                    user_id = command.user_id.as_i64(),
                    subscription_id = %subscription.id,
                    product_id = %command.product_id,
                    payment_term = %command.payment_term,
                    "Subscription upgraded"
                );
                Ok(UpgradeOutcome::Upgraded)
            }
            Err(e) => {
                tracing::error!(
                    subscription_id = %subscription.id,
                    error = %e,
                    "Provider rejected subscription upgrade"
                );
                Ok(UpgradeOutcome::rejected("Could not update your subscription"))
            }
        }
    }
}
