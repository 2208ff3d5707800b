//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the JSON request/response structure for the billing API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::{
    CancelOutcome, CheckoutOutcome, PortalOutcome, QuantityOutcome, RegistrationOutcome,
    UpgradeOutcome,
};
use crate::domain::billing::{PendingCheckoutSession, ProductCatalog, UpsellTarget};
use crate::ports::Subscription;

fn default_quantity() -> u32 {
    1
}

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: i64,
    pub product_id: String,
    pub payment_term: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Request to upgrade an active subscription in place.
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeRequest {
    pub user_id: i64,
    pub product_id: String,
    pub payment_term: String,
}

/// Notification from the host that an account finished registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationCompletedRequest {
    pub user_id: i64,
    /// Product selected during signup, if any.
    #[serde(default)]
    pub product_id: Option<String>,
    /// Payment term selected during signup, if any.
    #[serde(default)]
    pub payment_term: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Request to cancel the user's subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelRequest {
    pub user_id: i64,
}

/// Request to change the seat count on a subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct QuantityRequest {
    pub user_id: i64,
    pub quantity: u32,
}

/// Request for a billing portal redirect.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalRequest {
    pub user_id: i64,
    pub return_url: String,
}

/// Request to clear a pending checkout transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct ClearPendingRequest {
    pub user_id: i64,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for checkout initiation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutResponse {
    /// Send the customer to the hosted checkout page.
    Redirect {
        session_id: String,
        checkout_url: String,
    },
    /// Precondition failed; message is shown to the customer as-is.
    Rejected { message: String },
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        match outcome {
            CheckoutOutcome::Redirect { session_id, url } => Self::Redirect {
                session_id,
                checkout_url: url,
            },
            CheckoutOutcome::Rejected { message } => Self::Rejected { message },
        }
    }
}

/// Response for an upgrade attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpgradeResponse {
    Upgraded,
    Rejected { message: String },
}

impl From<UpgradeOutcome> for UpgradeResponse {
    fn from(outcome: UpgradeOutcome) -> Self {
        match outcome {
            UpgradeOutcome::Upgraded => Self::Upgraded,
            UpgradeOutcome::Rejected { message } => Self::Rejected { message },
        }
    }
}

/// Response for registration completion.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegistrationResponse {
    Completed,
    CompletedWithCheckout { checkout: CheckoutResponse },
}

impl From<RegistrationOutcome> for RegistrationResponse {
    fn from(outcome: RegistrationOutcome) -> Self {
        match outcome {
            RegistrationOutcome::Completed => Self::Completed,
            RegistrationOutcome::CompletedWithCheckout(checkout) => {
                Self::CompletedWithCheckout {
                    checkout: CheckoutResponse::from(checkout),
                }
            }
        }
    }
}

/// Response for a cancellation attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CancelResponse {
    Canceled,
    Rejected { message: String },
}

impl From<CancelOutcome> for CancelResponse {
    fn from(outcome: CancelOutcome) -> Self {
        match outcome {
            CancelOutcome::Canceled => Self::Canceled,
            CancelOutcome::Rejected { message } => Self::Rejected { message },
        }
    }
}

/// Response for a quantity update.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuantityResponse {
    Updated { quantity: u32 },
    Rejected { message: String },
}

impl From<QuantityOutcome> for QuantityResponse {
    fn from(outcome: QuantityOutcome) -> Self {
        match outcome {
            QuantityOutcome::Updated { quantity } => Self::Updated { quantity },
            QuantityOutcome::Rejected { message } => Self::Rejected { message },
        }
    }
}

/// Response for a billing portal request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PortalResponse {
    Redirect { portal_url: String },
    Rejected { message: String },
}

impl From<PortalOutcome> for PortalResponse {
    fn from(outcome: PortalOutcome) -> Self {
        match outcome {
            PortalOutcome::Redirect { url } => Self::Redirect { portal_url: url },
            PortalOutcome::Rejected { message } => Self::Rejected { message },
        }
    }
}

/// Response for subscription data.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    /// The subscription as the provider sees it, or null if none exists.
    pub subscription: Option<SubscriptionView>,
}

/// Subscription details exposed to the host.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub subscription_id: String,
    pub status: String,
    /// Internal product the subscription is for, from provider metadata.
    pub product_id: Option<String>,
    /// Internal payment term, from provider metadata.
    pub payment_term: Option<String>,
    pub quantity: u32,
    pub cancel_at_period_end: bool,
    /// Trial end as a Unix timestamp, if trialing.
    pub trial_end: Option<i64>,
    /// Current billing period end as a Unix timestamp.
    pub current_period_end: i64,
}

impl From<Subscription> for SubscriptionView {
    fn from(subscription: Subscription) -> Self {
        use crate::domain::billing::{META_PAYMENT_TERM, META_PRODUCT_ID};

        Self {
            subscription_id: subscription.id,
            status: subscription.status,
            product_id: subscription.metadata.get(META_PRODUCT_ID).cloned(),
            payment_term: subscription.metadata.get(META_PAYMENT_TERM).cloned(),
            quantity: subscription.quantity,
            cancel_at_period_end: subscription.cancel_at_period_end,
            trial_end: subscription.trial_end,
            current_period_end: subscription.current_period_end,
        }
    }
}

/// Response for a pending-transaction check.
#[derive(Debug, Clone, Serialize)]
pub struct PendingResponse {
    /// The pending checkout, or null if none exists.
    pub pending: Option<PendingView>,
}

/// Pending checkout details exposed to the host.
#[derive(Debug, Clone, Serialize)]
pub struct PendingView {
    pub session_id: String,
    pub product_id: String,
    pub payment_term: String,
    pub quantity: u32,
}

impl From<PendingCheckoutSession> for PendingView {
    fn from(pending: PendingCheckoutSession) -> Self {
        Self {
            session_id: pending.session_id,
            product_id: pending.product_id,
            payment_term: pending.payment_term,
            quantity: pending.quantity,
        }
    }
}

/// Response for the product catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductView>,
}

/// One sellable product with its payment terms.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub terms: Vec<PricingTermView>,
}

/// One payment term of a product.
#[derive(Debug, Clone, Serialize)]
pub struct PricingTermView {
    pub payment_term: String,
    /// Price in the currency's minor unit.
    pub unit_amount: i64,
    pub trial_period_days: Option<u32>,
    pub upsells: Vec<UpsellView>,
}

/// An allowed upgrade target.
#[derive(Debug, Clone, Serialize)]
pub struct UpsellView {
    pub product_id: String,
    pub payment_term: String,
}

impl From<&UpsellTarget> for UpsellView {
    fn from(target: &UpsellTarget) -> Self {
        Self {
            product_id: target.product_id.clone(),
            payment_term: target.payment_term.clone(),
        }
    }
}

impl From<ProductCatalog> for ProductsResponse {
    fn from(catalog: ProductCatalog) -> Self {
        let mut products: Vec<ProductView> = catalog
            .products
            .into_iter()
            .map(|(product_id, entry)| {
                let mut terms: Vec<PricingTermView> = entry
                    .pricing
                    .into_iter()
                    .map(|(payment_term, pricing)| PricingTermView {
                        payment_term,
                        unit_amount: pricing.unit_amount,
                        trial_period_days: pricing.trial_period_days,
                        upsells: pricing.upsells.iter().map(UpsellView::from).collect(),
                    })
                    .collect();
                terms.sort_by(|a, b| a.payment_term.cmp(&b.payment_term));

                ProductView {
                    product_id,
                    name: entry.name,
                    description: entry.description,
                    terms,
                }
            })
            .collect();
        products.sort_by(|a, b| a.product_id.cmp(&b.product_id));

        Self { products }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
