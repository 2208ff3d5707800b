//! Domain event emission.
//!
//! Turns a reconciled event into exactly one host notification. Publish
//! failures are logged and swallowed: the webhook was already applied to
//! local state, and a 5xx here would make the provider redeliver an
//! event we have processed.

use std::sync::Arc;

use crate::ports::NotificationPublisher;
use super::{BillingNotification, EmissionPlan, PaymentEventKind, ProductCatalog};

/// Emits billing notifications to the host.
pub struct DomainEventEmitter {
    publisher: Arc<dyn NotificationPublisher>,
}

impl DomainEventEmitter {
    pub fn new(publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self { publisher }
    }

    /// Publish the notification for a reconciled event.
    pub async fn emit(&self, plan: EmissionPlan, catalog: ProductCatalog) {
        let notification = Self::notification_for(plan, catalog);
        self.publish(notification).await;
    }

    /// Publish an arbitrary notification (registration-completed and
    /// other host-initiated flows).
    pub async fn publish(&self, notification: BillingNotification) {
        let name = notification.name();
        let user_id = notification.user().id;
        if let Err(e) = self.publisher.publish(notification).await {
            tracing::error!(
                notification = name,
                user_id = %user_id,
                error = %e,
                "Failed to publish billing notification"
            );
        }
    }

    fn notification_for(plan: EmissionPlan, catalog: ProductCatalog) -> BillingNotification {
        let EmissionPlan { user, event } = plan;
        match event.kind {
            PaymentEventKind::SubscriptionCreated | PaymentEventKind::SubscriptionUpdated => {
                BillingNotification::SubscriptionUpdated {
                    user,
                    product_id: event.product_id,
                    payment_term: event.payment_term,
                    status: event.status,
                    cancel_at_period_end: event.cancel_at_period_end,
                    raw_event: event.raw,
                    catalog,
                }
            }
            PaymentEventKind::SubscriptionDeleted => BillingNotification::SubscriptionDeleted {
                user,
                product_id: event.product_id,
                payment_term: event.payment_term,
                raw_event: event.raw,
                catalog,
            },
            PaymentEventKind::SubscriptionTrialEnding => {
                BillingNotification::SubscriptionTrialEnding {
                    user,
                    product_id: event.product_id,
                    payment_term: event.payment_term,
                    trial_end: event.trial_end,
                    raw_event: event.raw,
                    catalog,
                }
            }
            PaymentEventKind::InvoicePaymentSucceeded => BillingNotification::PaymentSucceeded {
                user,
                product_id: event.product_id,
                payment_term: event.payment_term,
                quantity: event.quantity,
                raw_event: event.raw,
                catalog,
            },
            PaymentEventKind::InvoicePaymentFailed => BillingNotification::PaymentFailed {
                user,
                product_id: event.product_id,
                payment_term: event.payment_term,
                raw_event: event.raw,
                catalog,
            },
            // Unrecognized never reaches the emitter; the reconciler drops it first.
            PaymentEventKind::InvoicePaymentActionRequired | PaymentEventKind::Unrecognized => {
                BillingNotification::PaymentActionRequired {
                    user,
                    product_id: event.product_id,
                    payment_term: event.payment_term,
                    raw_event: event.raw,
                    catalog,
                }
            }
        }
    }
}
