//! Billing notifications delivered to the host CMS.
//!
//! One notification per qualifying webhook or host-initiated action.
//! Webhook-driven notifications carry the user they concern, the product
//! and term named in the event metadata, the raw provider payload, and a
//! catalog snapshot so host-side listeners can render product details
//! without a provider round trip.

use serde::{Deserialize, Serialize};

use crate::ports::HostUser;
use super::ProductCatalog;

/// Notification published to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BillingNotification {
    /// User finished host-side registration.
    RegistrationCompleted {
        user: HostUser,
        catalog: ProductCatalog,
    },

    /// Invoice payment collected.
    PaymentSucceeded {
        user: HostUser,
        product_id: String,
        payment_term: String,
        quantity: u32,
        raw_event: serde_json::Value,
        catalog: ProductCatalog,
    },

    /// Invoice payment failed.
    PaymentFailed {
        user: HostUser,
        product_id: String,
        payment_term: String,
        raw_event: serde_json::Value,
        catalog: ProductCatalog,
    },

    /// Invoice payment needs customer action.
    PaymentActionRequired {
        user: HostUser,
        product_id: String,
        payment_term: String,
        raw_event: serde_json::Value,
        catalog: ProductCatalog,
    },

    /// Subscription created or changed at the provider.
    SubscriptionUpdated {
        user: HostUser,
        product_id: String,
        payment_term: String,
        status: String,
        cancel_at_period_end: bool,
        raw_event: serde_json::Value,
        catalog: ProductCatalog,
    },

    /// Subscription ended at the provider.
    SubscriptionDeleted {
        user: HostUser,
        product_id: String,
        payment_term: String,
        raw_event: serde_json::Value,
        catalog: ProductCatalog,
    },

    /// Trial period about to end.
    SubscriptionTrialEnding {
        user: HostUser,
        product_id: String,
        payment_term: String,
        trial_end: Option<i64>,
        raw_event: serde_json::Value,
        catalog: ProductCatalog,
    },
}

impl BillingNotification {
    /// Stable name used in logs and host-side routing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegistrationCompleted { .. } => "registration-completed",
            Self::PaymentSucceeded { .. } => "payment-succeeded",
            Self::PaymentFailed { .. } => "payment-failed",
            Self::PaymentActionRequired { .. } => "payment-action-required",
            Self::SubscriptionUpdated { .. } => "subscription-updated",
            Self::SubscriptionDeleted { .. } => "subscription-deleted",
            Self::SubscriptionTrialEnding { .. } => "subscription-trial-ending",
        }
    }

    /// The user the notification concerns.
    pub fn user(&self) -> &HostUser {
        match self {
            Self::RegistrationCompleted { user, .. }
            | Self::PaymentSucceeded { user, .. }
            | Self::PaymentFailed { user, .. }
            | Self::PaymentActionRequired { user, .. }
            | Self::SubscriptionUpdated { user, .. }
            | Self::SubscriptionDeleted { user, .. }
            | Self::SubscriptionTrialEnding { user, .. } => user,
        }
    }
}
