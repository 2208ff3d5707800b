//! Webhook error types for inbound payment events.
//!
//! Defines the error conditions the webhook endpoint can hit, with HTTP
//! status code mapping. The provider retries on nothing here: both
//! rejection variants map to 400, and recognized-but-dropped events are
//! acknowledged with 200 before an error is ever constructed.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that reject an inbound webhook request.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Request headers do not look like a provider delivery.
    #[error("Invalid request origin")]
    InvalidOrigin,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body is not a parsable provider event.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Store operation failed mid-reconciliation.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Maps the error to the HTTP status returned to the provider.
    ///
    /// 4xx responses tell the provider not to retry; only a store failure
    /// surfaces as 5xx so redelivery can succeed later.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidOrigin
            | WebhookError::InvalidSignature
            | WebhookError::MalformedEvent(_) => StatusCode::BAD_REQUEST,
            WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
