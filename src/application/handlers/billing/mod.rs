//! Billing handlers.
//!
//! Command and query handlers for subscription billing operations including:
//!
//! ## Commands
//! - Initiating checkout for a product and payment term
//! - Upgrading an active subscription to another product
//! - Completing host-side registration
//! - Cancelling a subscription
//! - Updating seat quantity
//! - Deleting a customer and its local records
//! - Processing payment webhooks
//! - Checking and clearing pending checkout transactions
//!
//! ## Queries
//! - Get a billing portal redirect
//! - Get subscription data for a user
//! - Get the product catalog

mod billing_portal;
mod cancel_subscription;
mod complete_registration;
mod delete_customer;
mod get_products;
mod get_subscription_data;
mod handle_payment_webhook;
mod initiate_checkout;
mod pending_transaction;
mod update_quantity;
mod upgrade_subscription;

// Commands
pub use cancel_subscription::{CancelOutcome, CancelSubscriptionCommand, CancelSubscriptionHandler};
pub use complete_registration::{
    CompleteRegistrationCommand, CompleteRegistrationHandler, RegistrationOutcome,
};
pub use delete_customer::{DeleteCustomerCommand, DeleteCustomerHandler};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use initiate_checkout::{CheckoutOutcome, InitiateCheckoutCommand, InitiateCheckoutHandler};
pub use pending_transaction::PendingTransactionHandler;
pub use update_quantity::{QuantityOutcome, UpdateQuantityCommand, UpdateQuantityHandler};
pub use upgrade_subscription::{
    UpgradeOutcome, UpgradeSubscriptionCommand, UpgradeSubscriptionHandler,
};

// Queries
pub use billing_portal::{BillingPortalCommand, BillingPortalHandler, PortalOutcome};
pub use get_products::GetProductsHandler;
pub use get_subscription_data::{GetSubscriptionDataHandler, GetSubscriptionDataQuery};
