//! Payment webhook processing handler.
//!
//! Orchestrates the full webhook pipeline: origin validation, signature
//! verification, event parsing, state reconciliation, and notification
//! emission. The provider retries on non-2xx, so every recognized-but-
//! uninteresting delivery still answers 200.

use std::sync::Arc;

use crate::domain::billing::{
    CatalogCache, DomainEventEmitter, EventParser, EventValidator, ParseError, ProductCatalog,
    ReconcileDecision, SubscriptionReconciler, WebhookError,
};
use crate::ports::{PaymentProvider, PaymentErrorCode};

/// Command to process an incoming payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as received (signature covers these bytes).
    pub payload: Vec<u8>,

    /// Stripe-Signature header value, if present.
    pub signature: Option<String>,

    /// User-Agent header value, if present.
    pub user_agent: Option<String>,

    /// Content-Type header value, if present.
    pub content_type: Option<String>,
}

/// Result of webhook processing. Both outcomes answer HTTP 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// Event was reconciled and a notification was emitted.
    Processed,

    /// Event was authenticated but intentionally not acted on.
    Dropped,
}

/// Handler for payment webhook processing.
pub struct HandlePaymentWebhookHandler {
    validator: EventValidator,
    provider: Arc<dyn PaymentProvider>,
    reconciler: SubscriptionReconciler,
    emitter: DomainEventEmitter,
    catalog: Arc<CatalogCache>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        validator: EventValidator,
        provider: Arc<dyn PaymentProvider>,
        reconciler: SubscriptionReconciler,
        emitter: DomainEventEmitter,
        catalog: Arc<CatalogCache>,
    ) -> Self {
        Self {
            validator,
            provider,
            reconciler,
            emitter,
            catalog,
        }
    }

    /// Process a webhook delivery.
    ///
    /// # Errors
    ///
    /// - `WebhookError::InvalidOrigin` - header gate failed (HTTP 400)
    /// - `WebhookError::InvalidSignature` - signature rejected (HTTP 400)
    /// - `WebhookError::MalformedEvent` - undecodable event body (HTTP 400)
    /// - `WebhookError::Database` - store failure during reconciliation (HTTP 500)
    pub async fn handle(
        &self,
        command: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Origin gate, before touching the body.
        self.validator
            .validate(command.user_agent.as_deref(), command.content_type.as_deref())?;

        // 2. Signature verification over the raw bytes.
        let signature = command.signature.as_deref().unwrap_or_default();
        let provider_event = self
            .provider
            .verify_webhook(&command.payload, signature)
            .await
            .map_err(|e| match e.code {
                PaymentErrorCode::InvalidWebhook => WebhookError::InvalidSignature,
                _ => WebhookError::MalformedEvent(e.message),
            })?;

        // 3. Decode into a domain event.
        let event = match EventParser::parse(&provider_event) {
            Ok(event) => event,
            Err(ParseError::NoQualifyingLineItem) => {
                tracing::warn!(
                    event_id = %provider_event.id,
                    event_type = %provider_event.event_type,
                    "Invoice carries no qualifying line item; dropping"
                );
                return Ok(HandlePaymentWebhookResult::Dropped);
            }
            Err(ParseError::Malformed(message)) => {
                return Err(WebhookError::MalformedEvent(message));
            }
        };

        // 4. Reconcile local state.
        let decision = self
            .reconciler
            .reconcile(&event)
            .await
            .map_err(|e| WebhookError::Database(e.message))?;

        match decision {
            ReconcileDecision::Emit(plan) => {
                // 5. Notify with a catalog snapshot. A catalog outage must not
                //    turn into a retry storm, so the emission proceeds with an
                //    empty snapshot.
                let catalog = match self.catalog.get().await {
                    Ok(catalog) => catalog.clone(),
                    Err(e) => {
                        tracing::error!(error = %e, "Catalog unavailable during emission");
                        ProductCatalog::empty()
                    }
                };

                self.emitter.emit(plan, catalog).await;
                Ok(HandlePaymentWebhookResult::Processed)
            }
            ReconcileDecision::Dropped(reason) => {
                tracing::debug!(?reason, event_id = %event.event_id, "Webhook dropped");
                Ok(HandlePaymentWebhookResult::Dropped)
            }
        }
    }
}
