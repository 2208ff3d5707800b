//! Billing domain module.
//!
//! Reconciles subscription state between the host CMS and the payment
//! provider, driven by provider webhooks and host-initiated commands.
//!
//! # Module Structure
//!
//! - `validator` - Header gate for inbound webhook requests
//! - `payment_event` - Normalized events and the tolerant parser
//! - `records` - Identity links and pending checkout sessions
//! - `status` - Subscription status classification
//! - `catalog` - Provider-mirrored product catalog with lazy cache
//! - `reconciler` - The state transition table
//! - `notifications` / `emitter` - Outbound host notifications
//! - `errors` - Webhook rejection errors

mod catalog;
mod emitter;
mod errors;
mod notifications;
mod payment_event;
mod reconciler;
mod records;
mod status;
mod validator;

pub use catalog::{CatalogCache, PricingEntry, ProductCatalog, ProductEntry, UpsellTarget};
pub use emitter::DomainEventEmitter;
pub use errors::WebhookError;
pub use notifications::BillingNotification;
pub use payment_event::{
    EventParser, ParseError, PaymentEvent, PaymentEventKind, META_PAYMENT_TERM, META_PRODUCT_ID,
    META_USER_ID,
};
pub use reconciler::{DropReason, EmissionPlan, ReconcileDecision, SubscriptionReconciler};
pub use records::{IdentityLink, PendingCheckoutSession, PendingSessionFilter};
pub use status::{is_active_or_trialing, is_defunct};
pub use validator::EventValidator;

#[cfg(test)]
pub use payment_event::PaymentEventBuilder;
