//! Payment provider port for external payment processing.
//!
//! Defines the contract for payment gateway integrations (e.g., Stripe).
//! Implementations handle customer and subscription management, checkout
//! session creation, catalog listings, and webhook authentication.
//!
//! # Design
//!
//! - **Gateway agnostic**: Interface works with any payment provider
//! - **Subscription-focused**: Optimized for recurring billing
//! - **Thin**: No retries or caching here; callers decide

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::UserId;

/// Port for payment provider integrations.
///
/// Handles customer management, subscription lifecycle, catalog listing,
/// checkout/portal sessions, and webhook signature verification.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a customer in the payment system.
    ///
    /// Returns the provider's customer ID for future reference.
    async fn create_customer(&self, request: CreateCustomerRequest)
        -> Result<Customer, PaymentError>;

    /// Get customer by provider ID.
    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>, PaymentError>;

    /// Delete a customer, cancelling any subscriptions it holds.
    async fn delete_customer(&self, customer_id: &str) -> Result<(), PaymentError>;

    /// List all active products with their metadata.
    async fn list_active_products(&self) -> Result<Vec<ProviderProduct>, PaymentError>;

    /// List all active recurring prices with their metadata.
    async fn list_active_prices(&self) -> Result<Vec<ProviderPrice>, PaymentError>;

    /// Create a checkout session for a new subscription purchase.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Get a checkout session by provider ID.
    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<CheckoutSession>, PaymentError>;

    /// Expire an open checkout session.
    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), PaymentError>;

    /// Create a billing portal session for subscription self-management.
    ///
    /// Returns a URL for the customer to manage their subscription.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError>;

    /// Get subscription by provider ID.
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Subscription>, PaymentError>;

    /// Cancel a subscription, invoicing any pending usage immediately.
    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), PaymentError>;

    /// Change the number of seats on an existing subscription.
    async fn update_subscription_quantity(
        &self,
        subscription_id: &str,
        quantity: u32,
    ) -> Result<Subscription, PaymentError>;

    /// Move an existing subscription to a different price.
    ///
    /// The provider keeps the same subscription item, clears any scheduled
    /// cancellation, and replaces the subscription metadata.
    async fn update_subscription_price(
        &self,
        request: UpdateSubscriptionPriceRequest,
    ) -> Result<Subscription, PaymentError>;

    /// Verify a webhook signature and parse the event envelope.
    ///
    /// Returns the authenticated event if valid, error if the signature
    /// does not match or the payload is not a provider event.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, PaymentError>;
}

/// Request to create a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Internal user ID (stored as metadata).
    pub user_id: UserId,

    /// Customer email address.
    pub email: String,

    /// Customer name (optional).
    pub name: Option<String>,
}

/// Customer in the payment system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Provider's customer ID.
    pub id: String,

    /// Customer email.
    pub email: String,

    /// Customer name.
    pub name: Option<String>,
}

/// Product as listed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProduct {
    /// Provider's product ID.
    pub id: String,

    /// Product name.
    pub name: String,

    /// Product description.
    pub description: String,

    /// Free-form metadata attached at the provider.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Recurring price as listed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPrice {
    /// Provider's price ID.
    pub id: String,

    /// Provider product this price belongs to.
    pub product_id: String,

    /// Amount in the smallest currency unit.
    pub unit_amount: i64,

    /// ISO currency code.
    pub currency: String,

    /// Free-form metadata attached at the provider.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Existing provider customer to attach the session to.
    pub customer_id: String,

    /// Price to purchase.
    pub price_id: String,

    /// Number of seats.
    pub quantity: u32,

    /// Free trial length in days, if the price offers one.
    pub trial_period_days: Option<u32>,

    /// Metadata copied onto the resulting subscription.
    pub subscription_metadata: HashMap<String, String>,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after canceled checkout.
    pub cancel_url: String,
}

/// Checkout session for payment completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID.
    pub id: String,

    /// URL for customer to complete checkout.
    pub url: String,

    /// Session status ("open", "complete", "expired").
    pub status: String,

    /// When the session expires (Unix timestamp).
    pub expires_at: i64,
}

/// Portal session for subscription management.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSession {
    /// Provider's session ID.
    pub id: String,

    /// URL for customer to access portal.
    pub url: String,
}

/// Subscription in the payment system.
///
/// Status is the provider's free-form string, passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Provider's subscription ID.
    pub id: String,

    /// Provider's customer ID.
    pub customer_id: String,

    /// Current subscription status, as reported by the provider.
    pub status: String,

    /// ID of the single subscription item.
    pub item_id: String,

    /// Price currently on the subscription item.
    pub price_id: String,

    /// Number of seats.
    pub quantity: u32,

    /// Whether subscription cancels at period end.
    pub cancel_at_period_end: bool,

    /// When the trial ends (Unix timestamp), if trialing.
    pub trial_end: Option<i64>,

    /// Current billing period end (Unix timestamp).
    pub current_period_end: i64,

    /// Subscription metadata at the provider.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Request to move a subscription to a different price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubscriptionPriceRequest {
    /// Subscription to modify.
    pub subscription_id: String,

    /// Subscription item whose price is replaced.
    pub item_id: String,

    /// New price for the item.
    pub price_id: String,

    /// Replacement subscription metadata.
    pub metadata: HashMap<String, String>,
}

/// Authenticated webhook event envelope from the payment provider.
///
/// Carries the provider's dotted event type string and the raw event
/// object; interpretation is left to the event parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEvent {
    /// Event ID from provider.
    pub id: String,

    /// Provider's dotted event type string (e.g. "customer.subscription.updated").
    pub event_type: String,

    /// When the event occurred (Unix timestamp).
    pub created: i64,

    /// The object that triggered the event.
    pub payload: serde_json::Value,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(
            PaymentErrorCode::NotFound,
            format!("{} not found", resource),
        )
    }

    /// Create an invalid webhook error.
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }

    /// Create a provider API error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Invalid webhook signature.
    InvalidWebhook,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
