//! In-memory adapters for testing.

mod subscription_store;

pub use subscription_store::InMemorySubscriptionStore;
