//! Notification publisher port.
//!
//! Outbound seam for the domain notifications the host CMS listens to.
//! Each qualifying webhook or host-initiated action produces exactly one
//! notification; delivery semantics beyond the publish call are the
//! implementation's concern.

use async_trait::async_trait;

use crate::domain::billing::BillingNotification;
use crate::domain::foundation::DomainError;

/// Publisher port for billing notifications.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publish a single notification.
    async fn publish(&self, notification: BillingNotification) -> Result<(), DomainError>;
}
