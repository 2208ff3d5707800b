//! Persistent billing records.
//!
//! Two flat records tie a host user to provider-side state: the customer
//! identity link and the pending checkout session. Both are keyed by
//! user, at most one row each.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;
use super::PaymentEvent;

/// Mapping from a host user to provider customer and subscription IDs.
///
/// Created when the user is first introduced to the provider (checkout
/// initiation). The subscription ID is set and cleared over the
/// subscription's life; the row itself only goes away when the host user
/// is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityLink {
    pub user_id: UserId,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

impl IdentityLink {
    /// Creates a link with a customer and no subscription yet.
    pub fn for_customer(user_id: UserId, customer_id: impl Into<String>) -> Self {
        Self {
            user_id,
            customer_id: Some(customer_id.into()),
            subscription_id: None,
        }
    }

    /// True if the link's customer matches the given provider customer ID.
    pub fn customer_matches(&self, customer_id: &str) -> bool {
        self.customer_id.as_deref() == Some(customer_id)
    }
}

/// A checkout session handed to the user but not yet completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckoutSession {
    pub user_id: UserId,
    pub session_id: String,
    pub product_id: String,
    pub payment_term: String,
    pub quantity: u32,
}

/// Filter for clearing pending checkout sessions.
///
/// Fields left `None` match anything. Built from webhook events, where
/// an empty product/term or zero quantity means the event did not say.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSessionFilter {
    pub product_id: Option<String>,
    pub payment_term: Option<String>,
    pub quantity: Option<u32>,
}

impl PendingSessionFilter {
    /// Matches every pending session.
    pub fn any() -> Self {
        Self::default()
    }

    /// Filter on what the event actually knows.
    pub fn from_event(event: &PaymentEvent) -> Self {
        Self {
            product_id: if event.product_id.is_empty() {
                None
            } else {
                Some(event.product_id.clone())
            },
            payment_term: if event.payment_term.is_empty() {
                None
            } else {
                Some(event.payment_term.clone())
            },
            quantity: if event.quantity == 0 {
                None
            } else {
                Some(event.quantity)
            },
        }
    }

    /// True if the pending session satisfies every supplied predicate.
    pub fn matches(&self, session: &PendingCheckoutSession) -> bool {
        self.product_id
            .as_ref()
            .map_or(true, |p| *p == session.product_id)
            && self
                .payment_term
                .as_ref()
                .map_or(true, |t| *t == session.payment_term)
            && self.quantity.map_or(true, |q| q == session.quantity)
    }
}
