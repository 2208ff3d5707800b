//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Pre-configured customers, subscriptions, and catalog listings
//! - Error injection
//! - Call tracking
//! - Webhook event simulation

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, CreateCustomerRequest, Customer, PaymentError,
    PaymentProvider, PortalSession, ProviderEvent, ProviderPrice, ProviderProduct, Subscription,
    UpdateSubscriptionPriceRequest,
};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
///
/// // Configure state
/// mock.add_subscription(Subscription { id: "sub_123".into(), ... });
///
/// // Inject errors
/// mock.set_method_error("update_subscription_price", PaymentError::provider("boom"));
///
/// // Use in tests
/// let result = mock.get_subscription("sub_123").await;
/// ```
#[derive(Default)]
pub struct MockPaymentProvider {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Customers by ID.
    customers: HashMap<String, Customer>,

    /// Subscriptions by ID.
    subscriptions: HashMap<String, Subscription>,

    /// Checkout sessions by ID.
    checkout_sessions: HashMap<String, CheckoutSession>,

    /// Catalog listings returned by the list calls.
    products: Vec<ProviderProduct>,
    prices: Vec<ProviderPrice>,

    /// Next webhook event to return from verification.
    next_webhook_event: Option<ProviderEvent>,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    /// Monotonic counter for generated IDs.
    id_counter: u64,

    /// Whether webhook verification always fails.
    reject_webhooks: bool,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    /// Create a new mock provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().reject_webhooks = true;
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Add a customer to the "database".
    pub fn add_customer(&self, customer: Customer) {
        let id = customer.id.clone();
        self.inner.lock().unwrap().customers.insert(id, customer);
    }

    /// Add a subscription to the "database".
    pub fn add_subscription(&self, subscription: Subscription) {
        let id = subscription.id.clone();
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .insert(id, subscription);
    }

    /// Set the catalog listings returned by the list calls.
    pub fn set_catalog(&self, products: Vec<ProviderProduct>, prices: Vec<ProviderPrice>) {
        let mut state = self.inner.lock().unwrap();
        state.products = products;
        state.prices = prices;
    }

    /// Set the webhook event to return on verification.
    pub fn set_webhook_event(&self, event: ProviderEvent) {
        self.inner.lock().unwrap().next_webhook_event = Some(event);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Fetch a subscription's current mock state.
    pub fn subscription(&self, subscription_id: &str) -> Option<Subscription> {
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .get(subscription_id)
            .cloned()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.inner.lock().unwrap();

        // Check method-specific error first
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Check global error (consumes it)
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.inner.lock().unwrap();
        state.id_counter += 1;
        format!("{}_mock_{}", prefix, state.id_counter)
    }
}

impl Clone for MockPaymentProvider {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        self.record_call(
            "create_customer",
            vec![request.user_id.to_string(), request.email.clone()],
        );
        self.check_error("create_customer")?;

        let customer = Customer {
            id: self.next_id("cus"),
            email: request.email,
            name: request.name,
        };

        self.inner
            .lock()
            .unwrap()
            .customers
            .insert(customer.id.clone(), customer.clone());

        Ok(customer)
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>, PaymentError> {
        self.record_call("get_customer", vec![customer_id.to_string()]);
        self.check_error("get_customer")?;

        let state = self.inner.lock().unwrap();
        Ok(state.customers.get(customer_id).cloned())
    }

    async fn delete_customer(&self, customer_id: &str) -> Result<(), PaymentError> {
        self.record_call("delete_customer", vec![customer_id.to_string()]);
        self.check_error("delete_customer")?;

        let mut state = self.inner.lock().unwrap();
        state.customers.remove(customer_id);
        state
            .subscriptions
            .retain(|_, s| s.customer_id != customer_id);
        Ok(())
    }

    async fn list_active_products(&self) -> Result<Vec<ProviderProduct>, PaymentError> {
        self.record_call("list_active_products", vec![]);
        self.check_error("list_active_products")?;

        Ok(self.inner.lock().unwrap().products.clone())
    }

    async fn list_active_prices(&self) -> Result<Vec<ProviderPrice>, PaymentError> {
        self.record_call("list_active_prices", vec![]);
        self.check_error("list_active_prices")?;

        Ok(self.inner.lock().unwrap().prices.clone())
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call(
            "create_checkout_session",
            vec![
                request.customer_id.clone(),
                request.price_id.clone(),
                request.quantity.to_string(),
            ],
        );
        self.check_error("create_checkout_session")?;

        let id = self.next_id("cs");
        let session = CheckoutSession {
            id: id.clone(),
            url: format!("https://checkout.stripe.com/c/pay/{}", id),
            status: "open".to_string(),
            expires_at: chrono::Utc::now().timestamp() + 24 * 60 * 60,
        };

        self.inner
            .lock()
            .unwrap()
            .checkout_sessions
            .insert(id, session.clone());

        Ok(session)
    }

    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<CheckoutSession>, PaymentError> {
        self.record_call("get_checkout_session", vec![session_id.to_string()]);
        self.check_error("get_checkout_session")?;

        let state = self.inner.lock().unwrap();
        Ok(state.checkout_sessions.get(session_id).cloned())
    }

    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), PaymentError> {
        self.record_call("expire_checkout_session", vec![session_id.to_string()]);
        self.check_error("expire_checkout_session")?;

        let mut state = self.inner.lock().unwrap();
        if let Some(session) = state.checkout_sessions.get_mut(session_id) {
            session.status = "expired".to_string();
        }
        Ok(())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        self.record_call(
            "create_portal_session",
            vec![customer_id.to_string(), return_url.to_string()],
        );
        self.check_error("create_portal_session")?;

        let id = self.next_id("bps");
        Ok(PortalSession {
            id: id.clone(),
            url: format!("https://billing.stripe.com/p/session/{}", id),
        })
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Subscription>, PaymentError> {
        self.record_call("get_subscription", vec![subscription_id.to_string()]);
        self.check_error("get_subscription")?;

        let state = self.inner.lock().unwrap();
        Ok(state.subscriptions.get(subscription_id).cloned())
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), PaymentError> {
        self.record_call("cancel_subscription", vec![subscription_id.to_string()]);
        self.check_error("cancel_subscription")?;

        let mut state = self.inner.lock().unwrap();
        let subscription = state
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| PaymentError::not_found("Subscription"))?;
        subscription.status = "canceled".to_string();
        Ok(())
    }

    async fn update_subscription_quantity(
        &self,
        subscription_id: &str,
        quantity: u32,
    ) -> Result<Subscription, PaymentError> {
        self.record_call(
            "update_subscription_quantity",
            vec![subscription_id.to_string(), quantity.to_string()],
        );
        self.check_error("update_subscription_quantity")?;

        let mut state = self.inner.lock().unwrap();
        let subscription = state
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| PaymentError::not_found("Subscription"))?;
        subscription.quantity = quantity;
        Ok(subscription.clone())
    }

    async fn update_subscription_price(
        &self,
        request: UpdateSubscriptionPriceRequest,
    ) -> Result<Subscription, PaymentError> {
        self.record_call(
            "update_subscription_price",
            vec![request.subscription_id.clone(), request.price_id.clone()],
        );
        self.check_error("update_subscription_price")?;

        let mut state = self.inner.lock().unwrap();
        let subscription = state
            .subscriptions
            .get_mut(&request.subscription_id)
            .ok_or_else(|| PaymentError::not_found("Subscription"))?;
        subscription.price_id = request.price_id;
        subscription.cancel_at_period_end = false;
        subscription.metadata = request.metadata;
        Ok(subscription.clone())
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, PaymentError> {
        self.record_call(
            "verify_webhook",
            vec![
                String::from_utf8_lossy(payload).chars().take(50).collect(),
                signature.chars().take(20).collect(),
            ],
        );
        self.check_error("verify_webhook")?;

        {
            let state = self.inner.lock().unwrap();
            if state.reject_webhooks {
                return Err(PaymentError::invalid_webhook("Verification disabled"));
            }
            if let Some(event) = &state.next_webhook_event {
                return Ok(event.clone());
            }
        }

        // No configured event: parse the payload as a provider envelope.
        let parsed: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::invalid_webhook(e.to_string()))?;

        Ok(ProviderEvent {
            id: parsed["id"].as_str().unwrap_or("evt_mock").to_string(),
            event_type: parsed["type"].as_str().unwrap_or("unknown").to_string(),
            created: parsed["created"]
                .as_i64()
                .unwrap_or_else(|| chrono::Utc::now().timestamp()),
            payload: parsed["data"]["object"].clone(),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Test Helpers
// ════════════════════════════════════════════════════════════════════════════════

impl MockPaymentProvider {
    /// Create a mock with a pre-configured active subscription.
    pub fn with_active_subscription(customer_id: &str, subscription_id: &str) -> Self {
        let mock = Self::new();

        mock.add_customer(Customer {
            id: customer_id.to_string(),
            email: "test@example.com".to_string(),
            name: Some("Test User".to_string()),
        });

        mock.add_subscription(Subscription {
            id: subscription_id.to_string(),
            customer_id: customer_id.to_string(),
            status: "active".to_string(),
            item_id: "si_mock".to_string(),
            price_id: "price_mock".to_string(),
            quantity: 1,
            cancel_at_period_end: false,
            trial_end: None,
            current_period_end: chrono::Utc::now().timestamp() + 30 * 24 * 60 * 60,
            metadata: HashMap::new(),
        });

        mock
    }
}
