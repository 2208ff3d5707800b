//! Notification publisher adapters.
//!
//! Implements the `NotificationPublisher` port:
//!
//! - `LogNotificationPublisher` - Structured-log delivery for production
//! - `InMemoryNotificationPublisher` - Captured delivery for tests

mod in_memory;
mod log_publisher;

pub use in_memory::InMemoryNotificationPublisher;
pub use log_publisher::LogNotificationPublisher;
