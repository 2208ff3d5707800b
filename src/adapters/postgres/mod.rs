//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresSubscriptionStore` - Identity links and pending checkout sessions

mod subscription_store;

pub use subscription_store::PostgresSubscriptionStore;
