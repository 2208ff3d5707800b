//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    BillingPortalCommand, BillingPortalHandler, CancelSubscriptionCommand,
    CancelSubscriptionHandler, CompleteRegistrationCommand, CompleteRegistrationHandler,
    DeleteCustomerCommand, DeleteCustomerHandler, GetProductsHandler, GetSubscriptionDataHandler,
    GetSubscriptionDataQuery, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    InitiateCheckoutCommand, InitiateCheckoutHandler, PendingTransactionHandler,
    UpdateQuantityCommand, UpdateQuantityHandler, UpgradeSubscriptionCommand,
    UpgradeSubscriptionHandler,
};
use crate::domain::billing::{
    CatalogCache, DomainEventEmitter, EventValidator, SubscriptionReconciler,
};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{NotificationPublisher, PaymentProvider, SubscriptionStore, UserDirectory};

use super::dto::{
    CancelRequest, CancelResponse, CheckoutRequest, CheckoutResponse, ClearPendingRequest,
    ErrorResponse, PendingResponse, PendingView, PortalRequest, PortalResponse, ProductsResponse,
    QuantityRequest, QuantityResponse, RegistrationCompletedRequest, RegistrationResponse,
    SubscriptionResponse, SubscriptionView, UpgradeRequest, UpgradeResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct BillingAppState {
    pub store: Arc<dyn SubscriptionStore>,
    pub users: Arc<dyn UserDirectory>,
    pub provider: Arc<dyn PaymentProvider>,
    pub publisher: Arc<dyn NotificationPublisher>,
    pub catalog: Arc<CatalogCache>,
    pub validator: EventValidator,
}

impl BillingAppState {
    fn emitter(&self) -> DomainEventEmitter {
        DomainEventEmitter::new(self.publisher.clone())
    }

    /// Create handlers on demand from the shared state.
    pub fn checkout_handler(&self) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(
            self.store.clone(),
            self.users.clone(),
            self.provider.clone(),
            self.catalog.clone(),
        )
    }

    pub fn upgrade_handler(&self) -> UpgradeSubscriptionHandler {
        UpgradeSubscriptionHandler::new(
            self.store.clone(),
            self.provider.clone(),
            self.catalog.clone(),
        )
    }

    pub fn registration_handler(&self) -> CompleteRegistrationHandler {
        CompleteRegistrationHandler::new(
            self.store.clone(),
            self.users.clone(),
            self.emitter(),
            self.catalog.clone(),
            Arc::new(self.checkout_handler()),
        )
    }

    pub fn cancel_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.store.clone(), self.provider.clone())
    }

    pub fn quantity_handler(&self) -> UpdateQuantityHandler {
        UpdateQuantityHandler::new(self.store.clone(), self.provider.clone())
    }

    pub fn delete_customer_handler(&self) -> DeleteCustomerHandler {
        DeleteCustomerHandler::new(self.store.clone(), self.provider.clone())
    }

    pub fn portal_handler(&self) -> BillingPortalHandler {
        BillingPortalHandler::new(self.store.clone(), self.provider.clone())
    }

    pub fn subscription_data_handler(&self) -> GetSubscriptionDataHandler {
        GetSubscriptionDataHandler::new(self.store.clone(), self.provider.clone())
    }

    pub fn products_handler(&self) -> GetProductsHandler {
        GetProductsHandler::new(self.catalog.clone())
    }

    pub fn pending_handler(&self) -> PendingTransactionHandler {
        PendingTransactionHandler::new(self.store.clone(), self.provider.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.validator.clone(),
            self.provider.clone(),
            SubscriptionReconciler::new(self.store.clone(), self.users.clone()),
            self.emitter(),
            self.catalog.clone(),
        )
    }
}

fn parse_user_id(raw: i64) -> Result<UserId, BillingApiError> {
    UserId::new(raw).map_err(|e| BillingApiError(DomainError::from(e)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /billing/checkout - Start a hosted checkout flow
pub async fn initiate_checkout(
    State(state): State<BillingAppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.checkout_handler();
    let cmd = InitiateCheckoutCommand {
        user_id: parse_user_id(request.user_id)?,
        product_id: request.product_id,
        payment_term: request.payment_term,
        quantity: request.quantity,
    };

    let outcome = handler.handle(cmd).await?;

    Ok(Json(CheckoutResponse::from(outcome)))
}

/// POST /billing/upgrade - Move an active subscription to another price
pub async fn upgrade_subscription(
    State(state): State<BillingAppState>,
    Json(request): Json<UpgradeRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.upgrade_handler();
    let cmd = UpgradeSubscriptionCommand {
        user_id: parse_user_id(request.user_id)?,
        product_id: request.product_id,
        payment_term: request.payment_term,
    };

    let outcome = handler.handle(cmd).await?;

    Ok(Json(UpgradeResponse::from(outcome)))
}

/// POST /billing/registration-completed - Host signals a confirmed account
pub async fn registration_completed(
    State(state): State<BillingAppState>,
    Json(request): Json<RegistrationCompletedRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.registration_handler();
    let cmd = CompleteRegistrationCommand {
        user_id: parse_user_id(request.user_id)?,
        product_id: request.product_id,
        payment_term: request.payment_term,
        quantity: request.quantity,
    };

    let outcome = handler.handle(cmd).await?;

    Ok(Json(RegistrationResponse::from(outcome)))
}

/// POST /billing/cancel - Cancel the user's subscription immediately
pub async fn cancel_subscription(
    State(state): State<BillingAppState>,
    Json(request): Json<CancelRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.cancel_handler();
    let cmd = CancelSubscriptionCommand {
        user_id: parse_user_id(request.user_id)?,
    };

    let outcome = handler.handle(cmd).await?;

    Ok(Json(CancelResponse::from(outcome)))
}

/// POST /billing/quantity - Change the seat count
pub async fn update_quantity(
    State(state): State<BillingAppState>,
    Json(request): Json<QuantityRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.quantity_handler();
    let cmd = UpdateQuantityCommand {
        user_id: parse_user_id(request.user_id)?,
        quantity: request.quantity,
    };

    let outcome = handler.handle(cmd).await?;

    Ok(Json(QuantityResponse::from(outcome)))
}

/// POST /billing/portal - Get a billing portal redirect URL
pub async fn billing_portal(
    State(state): State<BillingAppState>,
    Json(request): Json<PortalRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.portal_handler();
    let cmd = BillingPortalCommand {
        user_id: parse_user_id(request.user_id)?,
        return_url: request.return_url,
    };

    let outcome = handler.handle(cmd).await?;

    Ok(Json(PortalResponse::from(outcome)))
}

/// POST /billing/pending/clear - Clear a pending checkout transaction
pub async fn clear_pending(
    State(state): State<BillingAppState>,
    Json(request): Json<ClearPendingRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.pending_handler();

    handler.clear(parse_user_id(request.user_id)?).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /billing/customer/:user_id - Remove all billing records for a user
pub async fn delete_customer(
    State(state): State<BillingAppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.delete_customer_handler();
    let cmd = DeleteCustomerCommand {
        user_id: parse_user_id(user_id)?,
    };

    handler.handle(cmd).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /billing/subscription/:user_id - Current subscription as the provider sees it
pub async fn get_subscription(
    State(state): State<BillingAppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.subscription_data_handler();
    let query = GetSubscriptionDataQuery {
        user_id: parse_user_id(user_id)?,
    };

    let subscription = handler.handle(query).await?;

    Ok(Json(SubscriptionResponse {
        subscription: subscription.map(SubscriptionView::from),
    }))
}

/// GET /billing/pending/:user_id - Check for a pending checkout transaction
pub async fn get_pending(
    State(state): State<BillingAppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.pending_handler();

    let pending = handler.check(parse_user_id(user_id)?).await?;

    Ok(Json(PendingResponse {
        pending: pending.map(PendingView::from),
    }))
}

/// GET /billing/products - The sellable product catalog
pub async fn get_products(
    State(state): State<BillingAppState>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.products_handler();

    let catalog = handler.handle().await?;

    Ok(Json(ProductsResponse::from(catalog)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handler
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/stripe - Handle payment provider webhook events
///
/// Answers 200 with an empty body for both processed and intentionally
/// dropped events; the provider retries anything else.
pub async fn handle_payment_webhook(
    State(state): State<BillingAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: header("stripe-signature"),
        user_agent: header("user-agent"),
        content_type: header("content-type"),
    };

    match handler.handle(cmd).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Webhook delivery rejected");
            e.status_code().into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
pub struct BillingApiError(DomainError);

impl From<DomainError> for BillingApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match self.0.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            ErrorCode::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            ErrorCode::ProductNotFound => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
            ErrorCode::IdentityLinkNotFound => (StatusCode::NOT_FOUND, "IDENTITY_LINK_NOT_FOUND"),
            ErrorCode::IdentityMismatch => (StatusCode::CONFLICT, "IDENTITY_MISMATCH"),
            ErrorCode::SubscriptionHeld => (StatusCode::CONFLICT, "SUBSCRIPTION_HELD"),
            ErrorCode::PaymentProviderError => (StatusCode::BAD_GATEWAY, "PAYMENT_PROVIDER_ERROR"),
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(error_code, self.0.message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryNotificationPublisher;
    use crate::adapters::host::StaticUserDirectory;
    use crate::adapters::memory::InMemorySubscriptionStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::billing::IdentityLink;
    use crate::ports::HostUser;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn test_state_with(store: InMemorySubscriptionStore) -> BillingAppState {
        let provider: Arc<dyn PaymentProvider> = Arc::new(MockPaymentProvider::new());
        BillingAppState {
            store: Arc::new(store),
            users: Arc::new(StaticUserDirectory::new().with_user(HostUser {
                id: UserId::new(1).unwrap(),
                email: "one@example.com".to_string(),
                display_name: None,
            })),
            provider: Arc::clone(&provider),
            publisher: Arc::new(InMemoryNotificationPublisher::new()),
            catalog: Arc::new(CatalogCache::new(provider, "https://example.com")),
            validator: EventValidator::new("Stripe/1.0"),
        }
    }

    fn test_state() -> BillingAppState {
        test_state_with(InMemorySubscriptionStore::new())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn get_subscription_returns_null_for_unlinked_user() {
        let state = test_state();

        let result = get_subscription(State(state), Path(1)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn get_pending_returns_null_when_none() {
        let state = test_state();

        let result = get_pending(State(state), Path(1)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn cancel_without_subscription_is_rejected_not_an_error() {
        let state = test_state();

        let result = cancel_subscription(
            State(state),
            Json(CancelRequest { user_id: 1 }),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn delete_customer_removes_link() {
        let store = InMemorySubscriptionStore::new().with_link(IdentityLink {
            user_id: UserId::new(1).unwrap(),
            customer_id: None,
            subscription_id: None,
        });
        let state = test_state_with(store);

        let result = delete_customer(State(state), Path(1)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn nonpositive_user_id_maps_to_bad_request() {
        let state = test_state();

        let result = get_subscription(State(state), Path(0)).await;
        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_without_valid_origin_is_bad_request() {
        let state = test_state();

        let response = handle_payment_webhook(
            State(state),
            axum::http::HeaderMap::new(),
            axum::body::Bytes::from_static(b"{}"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn api_error_maps_user_not_found_to_404() {
        let err = BillingApiError(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_validation_to_400() {
        let err = BillingApiError(DomainError::new(ErrorCode::InvalidFormat, "bad input"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_provider_failure_to_502() {
        let err = BillingApiError(DomainError::new(
            ErrorCode::PaymentProviderError,
            "provider unavailable",
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn api_error_maps_database_failure_to_500() {
        let err = BillingApiError(DomainError::new(ErrorCode::DatabaseError, "connection lost"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
