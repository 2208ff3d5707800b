//! In-memory notification publisher for testing.
//!
//! Captures published notifications for deterministic test assertions.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are
//! poisoned. Production code should use the logging publisher.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::billing::BillingNotification;
use crate::domain::foundation::DomainError;
use crate::ports::NotificationPublisher;

/// In-memory notification publisher for testing.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
///
/// # Example
///
/// ```ignore
/// let publisher = Arc::new(InMemoryNotificationPublisher::new());
///
/// publisher.publish(notification).await?;
///
/// assert_eq!(publisher.count(), 1);
/// assert!(publisher.has_notification("payment-succeeded"));
/// ```
#[derive(Default)]
pub struct InMemoryNotificationPublisher {
    published: RwLock<Vec<BillingNotification>>,
}

impl InMemoryNotificationPublisher {
    /// Creates a new empty publisher.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all published notifications (for test assertions).
    pub fn published(&self) -> Vec<BillingNotification> {
        self.published
            .read()
            .expect("InMemoryNotificationPublisher: lock poisoned")
            .clone()
    }

    /// Returns notifications with a specific name.
    pub fn notifications_named(&self, name: &str) -> Vec<BillingNotification> {
        self.published()
            .into_iter()
            .filter(|n| n.name() == name)
            .collect()
    }

    /// Checks if a notification with the given name was published.
    pub fn has_notification(&self, name: &str) -> bool {
        self.published().iter().any(|n| n.name() == name)
    }

    /// Returns count of published notifications.
    pub fn count(&self) -> usize {
        self.published
            .read()
            .expect("InMemoryNotificationPublisher: lock poisoned")
            .len()
    }

    /// Clears all published notifications (for test isolation).
    pub fn clear(&self) {
        self.published
            .write()
            .expect("InMemoryNotificationPublisher: lock poisoned")
            .clear();
    }
}

#[async_trait]
impl NotificationPublisher for InMemoryNotificationPublisher {
    async fn publish(&self, notification: BillingNotification) -> Result<(), DomainError> {
        self.published
            .write()
            .expect("InMemoryNotificationPublisher: lock poisoned")
            .push(notification);
        Ok(())
    }
}
