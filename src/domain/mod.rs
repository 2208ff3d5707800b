//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `billing` - Subscription reconciliation, catalog, and notifications

pub mod billing;
pub mod foundation;
