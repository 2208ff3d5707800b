//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::billing::{
    // Webhook pipeline
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    // Checkout and lifecycle
    CancelOutcome, CancelSubscriptionCommand, CancelSubscriptionHandler,
    CheckoutOutcome, CompleteRegistrationCommand, CompleteRegistrationHandler,
    DeleteCustomerCommand, DeleteCustomerHandler,
    InitiateCheckoutCommand, InitiateCheckoutHandler,
    PendingTransactionHandler,
    QuantityOutcome, RegistrationOutcome,
    UpdateQuantityCommand, UpdateQuantityHandler,
    UpgradeOutcome, UpgradeSubscriptionCommand, UpgradeSubscriptionHandler,
    // Queries
    BillingPortalCommand, BillingPortalHandler, GetProductsHandler,
    GetSubscriptionDataHandler, GetSubscriptionDataQuery, PortalOutcome,
};
