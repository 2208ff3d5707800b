//! Structured-log notification publisher.
//!
//! Emits each billing notification as a structured JSON log line. Host-side
//! tooling tails these lines to drive emails and account-state updates.

use async_trait::async_trait;

use crate::domain::billing::BillingNotification;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::NotificationPublisher;

/// Publishes billing notifications to the structured log stream.
#[derive(Default)]
pub struct LogNotificationPublisher;

impl LogNotificationPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationPublisher for LogNotificationPublisher {
    async fn publish(&self, notification: BillingNotification) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&notification).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize notification: {}", e),
            )
        })?;

        tracing::info!(
            notification = notification.name(),
            user_id = notification.user().id.as_i64(),
            payload = %payload,
            "Billing notification"
        );

        Ok(())
    }
}
