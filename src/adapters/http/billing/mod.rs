//! HTTP adapter for billing endpoints.
//!
//! Exposes the billing module via REST API:
//! - `POST /v1/billing/checkout` - Start a hosted checkout flow
//! - `POST /v1/billing/upgrade` - Move an active subscription to another price
//! - `POST /v1/billing/registration-completed` - Host signals a confirmed account
//! - `POST /v1/billing/cancel` - Cancel the user's subscription
//! - `POST /v1/billing/quantity` - Change the seat count
//! - `POST /v1/billing/portal` - Get a billing portal redirect URL
//! - `POST /v1/billing/pending/clear` - Clear a pending checkout transaction
//! - `GET /v1/billing/subscription/:user_id` - Current subscription data
//! - `GET /v1/billing/pending/:user_id` - Check for a pending checkout
//! - `GET /v1/billing/products` - The sellable product catalog
//! - `DELETE /v1/billing/customer/:user_id` - Remove all billing records
//! - `POST /v1/webhooks/stripe` - Handle payment provider webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BillingAppState;
pub use routes::{billing_router, billing_routes, webhook_routes};
