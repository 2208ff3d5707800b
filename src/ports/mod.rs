//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - Payment gateway (customers, catalog, checkout,
//!   subscriptions, webhook authentication)
//! - `SubscriptionStore` - Identity links and pending checkout sessions
//! - `UserDirectory` - Host CMS user lookups
//! - `NotificationPublisher` - Outbound billing notifications

mod notification_publisher;
mod payment_provider;
mod subscription_store;
mod user_directory;

pub use notification_publisher::NotificationPublisher;
pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, CreateCustomerRequest, Customer, PaymentError,
    PaymentErrorCode, PaymentProvider, PortalSession, ProviderEvent, ProviderPrice,
    ProviderProduct, Subscription, UpdateSubscriptionPriceRequest,
};
pub use subscription_store::SubscriptionStore;
pub use user_directory::{HostUser, UserDirectory};
