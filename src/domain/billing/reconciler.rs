//! Subscription state reconciliation.
//!
//! Applies one normalized payment event to local state and decides
//! whether the host should be notified. The decision table:
//!
//! - Unrecognized events: dropped without logging.
//! - Events with no usable internal user: logged and dropped.
//! - Subscription created/updated: clear the matching pending checkout
//!   session, then idempotently record the subscription ID on the
//!   identity link, then notify.
//! - Subscription deleted, trial ending, and all invoice events: notify
//!   only, no local writes.
//!
//! The reconciler never creates identity links; those are written when a
//! checkout session is initiated. A link with a different customer ID is
//! a consistency fault: it is logged, the write is skipped, but pending
//! clearing and notification still happen so the host is not silenced by
//! a dirty row.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{HostUser, SubscriptionStore, UserDirectory};
use super::{PaymentEvent, PaymentEventKind, PendingSessionFilter};

/// Why an event produced no notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Event type outside the handled set.
    Unrecognized,
    /// Event metadata carried no usable internal user ID.
    MissingUser,
    /// Metadata named a user the host does not know.
    UnknownUser,
}

/// A reconciled event ready for notification.
#[derive(Debug, Clone)]
pub struct EmissionPlan {
    pub user: HostUser,
    pub event: PaymentEvent,
}

/// Outcome of reconciling one event.
#[derive(Debug, Clone)]
pub enum ReconcileDecision {
    /// Notify the host about this event.
    Emit(EmissionPlan),
    /// Nothing to do.
    Dropped(DropReason),
}

/// Reconciles provider events against local identity state.
pub struct SubscriptionReconciler {
    store: Arc<dyn SubscriptionStore>,
    users: Arc<dyn UserDirectory>,
}

impl SubscriptionReconciler {
    pub fn new(store: Arc<dyn SubscriptionStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { store, users }
    }

    /// Apply one event. Store failures propagate; everything else
    /// resolves to a decision.
    pub async fn reconcile(
        &self,
        event: &PaymentEvent,
    ) -> Result<ReconcileDecision, DomainError> {
        if event.kind == PaymentEventKind::Unrecognized {
            return Ok(ReconcileDecision::Dropped(DropReason::Unrecognized));
        }

        let Some(user_id) = event.user_id else {
            tracing::error!(
                event_id = %event.event_id,
                event_type = event.kind.as_str(),
                customer_id = %event.customer_id,
                "Payment event carries no usable internal user ID"
            );
            return Ok(ReconcileDecision::Dropped(DropReason::MissingUser));
        };

        let Some(user) = self.users.find_user(user_id).await? else {
            tracing::error!(
                event_id = %event.event_id,
                event_type = event.kind.as_str(),
                user_id = %user_id,
                "Payment event references unknown host user"
            );
            return Ok(ReconcileDecision::Dropped(DropReason::UnknownUser));
        };

        if matches!(
            event.kind,
            PaymentEventKind::SubscriptionCreated | PaymentEventKind::SubscriptionUpdated
        ) {
            self.apply_subscription_change(user_id, event).await?;
        }

        Ok(ReconcileDecision::Emit(EmissionPlan {
            user,
            event: event.clone(),
        }))
    }

    async fn apply_subscription_change(
        &self,
        user_id: UserId,
        event: &PaymentEvent,
    ) -> Result<(), DomainError> {
        // The purchase this event confirms is no longer pending.
        let filter = PendingSessionFilter::from_event(event);
        self.store.delete_pending_session(user_id, &filter).await?;

        let Some(link) = self.store.find_identity_link(user_id).await? else {
            tracing::error!(
                event_id = %event.event_id,
                user_id = %user_id,
                "Subscription event for user with no identity link"
            );
            return Ok(());
        };

        if !link.customer_matches(&event.customer_id) {
            tracing::error!(
                event_id = %event.event_id,
                user_id = %user_id,
                stored_customer = link.customer_id.as_deref().unwrap_or(""),
                event_customer = %event.customer_id,
                "Customer ID mismatch between identity link and payment event"
            );
            return Ok(());
        }

        if link.subscription_id != event.subscription_id {
            self.store
                .set_subscription_id(user_id, event.subscription_id.clone())
                .await?;
        }

        Ok(())
    }
}
