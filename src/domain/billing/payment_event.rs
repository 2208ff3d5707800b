//! Normalized payment events.
//!
//! Translates the provider's raw webhook envelopes into one immutable
//! `PaymentEvent` per delivery. All tolerant decoding lives here: absent
//! fields default to empty/zero, and downstream code never touches the
//! wire shape again.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::foundation::UserId;
use crate::ports::ProviderEvent;

/// Metadata key carrying the internal host user ID.
pub const META_USER_ID: &str = "internal_user_id";
/// Metadata key carrying the internal catalog product ID.
pub const META_PRODUCT_ID: &str = "internal_product_id";
/// Metadata key carrying the billing term.
pub const META_PAYMENT_TERM: &str = "internal_payment_term";

/// Recognized provider event kinds.
///
/// A closed set; anything else the provider sends maps to `Unrecognized`
/// and is dropped without processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEventKind {
    /// Subscription created at the provider.
    SubscriptionCreated,
    /// Subscription state changed (status, plan, cancellation flag).
    SubscriptionUpdated,
    /// Subscription ended.
    SubscriptionDeleted,
    /// Trial period is about to end.
    SubscriptionTrialEnding,
    /// Invoice payment collected successfully.
    InvoicePaymentSucceeded,
    /// Invoice payment failed.
    InvoicePaymentFailed,
    /// Invoice payment needs customer action (e.g. 3DS).
    InvoicePaymentActionRequired,
    /// Event type we do not handle.
    Unrecognized,
}

impl PaymentEventKind {
    /// Parse the provider's dotted event type string.
    pub fn from_provider_type(s: &str) -> Self {
        match s {
            "customer.subscription.created" => Self::SubscriptionCreated,
            "customer.subscription.updated" => Self::SubscriptionUpdated,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            "customer.subscription.trial_will_end" => Self::SubscriptionTrialEnding,
            "invoice.payment_succeeded" => Self::InvoicePaymentSucceeded,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            "invoice.payment_action_required" => Self::InvoicePaymentActionRequired,
            _ => Self::Unrecognized,
        }
    }

    /// Convert to the provider's event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionCreated => "customer.subscription.created",
            Self::SubscriptionUpdated => "customer.subscription.updated",
            Self::SubscriptionDeleted => "customer.subscription.deleted",
            Self::SubscriptionTrialEnding => "customer.subscription.trial_will_end",
            Self::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::InvoicePaymentActionRequired => "invoice.payment_action_required",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// True for subscription lifecycle events (carried on the
    /// subscription object rather than an invoice).
    pub fn is_subscription_event(&self) -> bool {
        matches!(
            self,
            Self::SubscriptionCreated
                | Self::SubscriptionUpdated
                | Self::SubscriptionDeleted
                | Self::SubscriptionTrialEnding
        )
    }

    /// True for invoice payment events.
    pub fn is_invoice_event(&self) -> bool {
        matches!(
            self,
            Self::InvoicePaymentSucceeded
                | Self::InvoicePaymentFailed
                | Self::InvoicePaymentActionRequired
        )
    }
}

/// One normalized webhook delivery.
///
/// Unknown fields carry their neutral defaults: empty strings for
/// product/term/status, zero for quantity, `None` for the user and
/// subscription IDs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Provider event ID.
    pub event_id: String,

    /// Recognized event kind.
    pub kind: PaymentEventKind,

    /// Provider customer ID the event concerns.
    pub customer_id: String,

    /// Provider subscription ID, when the event carries one.
    pub subscription_id: Option<String>,

    /// Internal user, when the metadata carried a valid one.
    pub user_id: Option<UserId>,

    /// Internal product ID from metadata; empty when unknown.
    pub product_id: String,

    /// Billing term from metadata; empty when unknown.
    pub payment_term: String,

    /// Seat count; zero when unknown.
    pub quantity: u32,

    /// Provider subscription status string, passed through untouched.
    /// Empty for invoice events.
    pub status: String,

    /// Whether the subscription is scheduled to cancel at period end.
    pub cancel_at_period_end: bool,

    /// Trial end (Unix timestamp), when present.
    pub trial_end: Option<i64>,

    /// The raw provider event object, forwarded to the host unmodified.
    pub raw: serde_json::Value,
}

/// Errors from event normalization.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Payload shape does not match the event type.
    #[error("Malformed event payload: {0}")]
    Malformed(String),

    /// Invoice event had no line item with a usable internal user ID.
    #[error("No invoice line item carries a valid internal user ID")]
    NoQualifyingLineItem,
}

// Wire shapes, decoded tolerantly. Only fields we read are listed;
// everything defaults when absent.

#[derive(Debug, Default, Deserialize)]
struct SubscriptionObject {
    #[serde(default)]
    id: String,
    #[serde(default)]
    customer: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    cancel_at_period_end: bool,
    #[serde(default)]
    trial_end: Option<i64>,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    items: ItemList,
}

#[derive(Debug, Default, Deserialize)]
struct ItemList {
    #[serde(default)]
    data: Vec<SubscriptionItem>,
}

#[derive(Debug, Default, Deserialize)]
struct SubscriptionItem {
    #[serde(default)]
    quantity: u32,
}

#[derive(Debug, Default, Deserialize)]
struct InvoiceObject {
    #[serde(default)]
    customer: String,
    #[serde(default)]
    subscription: Option<String>,
    #[serde(default)]
    lines: LineList,
}

#[derive(Debug, Default, Deserialize)]
struct LineList {
    #[serde(default)]
    data: Vec<InvoiceLine>,
}

#[derive(Debug, Default, Deserialize)]
struct InvoiceLine {
    #[serde(default)]
    quantity: u32,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// Normalizes authenticated provider events into `PaymentEvent`s.
pub struct EventParser;

impl EventParser {
    /// Parse a verified provider event.
    ///
    /// Subscription events read metadata from the subscription object.
    /// Invoice events read metadata from the first line item whose
    /// internal user ID parses to a positive integer; remaining lines
    /// are ignored.
    pub fn parse(event: &ProviderEvent) -> Result<PaymentEvent, ParseError> {
        let kind = PaymentEventKind::from_provider_type(&event.event_type);

        if kind.is_invoice_event() {
            return Self::parse_invoice(event, kind);
        }
        // Unrecognized kinds take the subscription path: the defaults are
        // harmless and the reconciler drops them before anything is read.
        Self::parse_subscription(event, kind)
    }

    fn parse_subscription(
        event: &ProviderEvent,
        kind: PaymentEventKind,
    ) -> Result<PaymentEvent, ParseError> {
        let sub: SubscriptionObject = serde_json::from_value(event.payload.clone())
            .map_err(|e| ParseError::Malformed(e.to_string()))?;

        let quantity = sub.items.data.first().map(|i| i.quantity).unwrap_or(0);

        Ok(PaymentEvent {
            event_id: event.id.clone(),
            kind,
            customer_id: sub.customer,
            subscription_id: if sub.id.is_empty() { None } else { Some(sub.id) },
            user_id: metadata_user(&sub.metadata),
            product_id: metadata_value(&sub.metadata, META_PRODUCT_ID),
            payment_term: metadata_value(&sub.metadata, META_PAYMENT_TERM),
            quantity,
            status: sub.status,
            cancel_at_period_end: sub.cancel_at_period_end,
            trial_end: sub.trial_end,
            raw: event.payload.clone(),
        })
    }

    fn parse_invoice(
        event: &ProviderEvent,
        kind: PaymentEventKind,
    ) -> Result<PaymentEvent, ParseError> {
        let invoice: InvoiceObject = serde_json::from_value(event.payload.clone())
            .map_err(|e| ParseError::Malformed(e.to_string()))?;

        let line = invoice
            .lines
            .data
            .iter()
            .find(|l| metadata_user(&l.metadata).is_some())
            .ok_or(ParseError::NoQualifyingLineItem)?;

        Ok(PaymentEvent {
            event_id: event.id.clone(),
            kind,
            customer_id: invoice.customer,
            subscription_id: invoice.subscription,
            user_id: metadata_user(&line.metadata),
            product_id: metadata_value(&line.metadata, META_PRODUCT_ID),
            payment_term: metadata_value(&line.metadata, META_PAYMENT_TERM),
            quantity: line.quantity,
            status: String::new(),
            cancel_at_period_end: false,
            trial_end: None,
            raw: event.payload.clone(),
        })
    }
}

fn metadata_user(metadata: &HashMap<String, String>) -> Option<UserId> {
    metadata
        .get(META_USER_ID)
        .and_then(|raw| UserId::parse_metadata(raw))
}

fn metadata_value(metadata: &HashMap<String, String>, key: &str) -> String {
    metadata.get(key).cloned().unwrap_or_default()
}

/// Builder for creating test PaymentEvent instances.
#[cfg(test)]
pub struct PaymentEventBuilder {
    event_id: String,
    kind: PaymentEventKind,
    customer_id: String,
    subscription_id: Option<String>,
    user_id: Option<UserId>,
    product_id: String,
    payment_term: String,
    quantity: u32,
    status: String,
    cancel_at_period_end: bool,
    trial_end: Option<i64>,
    raw: serde_json::Value,
}

#[cfg(test)]
impl Default for PaymentEventBuilder {
    fn default() -> Self {
        Self {
            event_id: "evt_test_123".to_string(),
            kind: PaymentEventKind::SubscriptionUpdated,
            customer_id: "cus_test".to_string(),
            subscription_id: Some("sub_test".to_string()),
            user_id: UserId::new(1).ok(),
            product_id: "speedsentry".to_string(),
            payment_term: "monthly".to_string(),
            quantity: 1,
            status: "active".to_string(),
            cancel_at_period_end: false,
            trial_end: None,
            raw: serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
impl PaymentEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: PaymentEventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn customer_id(mut self, id: impl Into<String>) -> Self {
        self.customer_id = id.into();
        self
    }

    pub fn subscription_id(mut self, id: Option<&str>) -> Self {
        self.subscription_id = id.map(str::to_string);
        self
    }

    pub fn user_id(mut self, id: Option<i64>) -> Self {
        self.user_id = id.and_then(|n| UserId::new(n).ok());
        self
    }

    pub fn product(mut self, product_id: impl Into<String>, term: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self.payment_term = term.into();
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn cancel_at_period_end(mut self, flag: bool) -> Self {
        self.cancel_at_period_end = flag;
        self
    }

    pub fn trial_end(mut self, ts: Option<i64>) -> Self {
        self.trial_end = ts;
        self
    }

    pub fn raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }

    pub fn build(self) -> PaymentEvent {
        PaymentEvent {
            event_id: self.event_id,
            kind: self.kind,
            customer_id: self.customer_id,
            subscription_id: self.subscription_id,
            user_id: self.user_id,
            product_id: self.product_id,
            payment_term: self.payment_term,
            quantity: self.quantity,
            status: self.status,
            cancel_at_period_end: self.cancel_at_period_end,
            trial_end: self.trial_end,
            raw: self.raw,
        }
    }
}
