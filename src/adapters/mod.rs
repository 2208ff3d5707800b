//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `stripe` - Stripe payment provider (API client, webhook verification)
//! - `postgres` - PostgreSQL persistence
//! - `host` - Host CMS user directory
//! - `events` - Notification publishers (log, in-memory)
//! - `memory` - In-memory storage for tests
//! - `http` - Axum HTTP surface

pub mod events;
pub mod host;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
