//! Axum router configuration for billing endpoints.
//!
//! This module defines the route structure for billing-related API endpoints
//! and wires them to their corresponding handlers.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    billing_portal, cancel_subscription, clear_pending, delete_customer, get_pending,
    get_products, get_subscription, handle_payment_webhook, initiate_checkout,
    registration_completed, update_quantity, upgrade_subscription, BillingAppState,
};

/// Create the billing API router.
///
/// # Routes
///
/// ## Host Endpoints (trusted caller, served on the internal network)
/// - `POST /checkout` - Start a hosted checkout flow
/// - `POST /upgrade` - Move an active subscription to another price
/// - `POST /registration-completed` - Host signals a confirmed account
/// - `POST /cancel` - Cancel the user's subscription
/// - `POST /quantity` - Change the seat count
/// - `POST /portal` - Get a billing portal redirect URL
/// - `POST /pending/clear` - Clear a pending checkout transaction
/// - `GET /subscription/:user_id` - Current subscription data
/// - `GET /pending/:user_id` - Check for a pending checkout
/// - `GET /products` - The sellable product catalog
/// - `DELETE /customer/:user_id` - Remove all billing records for a user
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/checkout", post(initiate_checkout))
        .route("/upgrade", post(upgrade_subscription))
        .route("/registration-completed", post(registration_completed))
        .route("/cancel", post(cancel_subscription))
        .route("/quantity", post(update_quantity))
        .route("/portal", post(billing_portal))
        .route("/pending/clear", post(clear_pending))
        .route("/subscription/:user_id", get(get_subscription))
        .route("/pending/:user_id", get(get_pending))
        .route("/products", get(get_products))
        .route("/customer/:user_id", delete(delete_customer))
}

/// Create the payment webhook router.
///
/// This is separate from the host-facing routes because webhook deliveries
/// carry no caller identity; they are authenticated by signature instead.
///
/// # Routes
/// - `POST /stripe` - Handle payment provider webhooks
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/stripe", post(handle_payment_webhook))
}

/// Create the complete billing module router.
///
/// Combines host-facing routes and webhook routes into a single router
/// suitable for mounting at `/v1`.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/billing", billing_routes())
        .nest("/webhooks", webhook_routes())
}
