//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API.
//! Handles customers, the product/price catalog, checkout and portal
//! sessions, subscription changes, and webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(secret_key, webhook_secret);
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, CreateCustomerRequest, Customer, PaymentError,
    PaymentErrorCode, PaymentProvider, PortalSession, ProviderEvent, ProviderPrice,
    ProviderProduct, Subscription, UpdateSubscriptionPriceRequest,
};

use super::webhook_types::{
    hex_encode, SignatureHeader, StripeCheckoutSession, StripeCustomer, StripeList,
    StripePortalSession, StripePrice, StripeProduct, StripeSubscription, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Page size for catalog list calls.
const LIST_PAGE_LIMIT: &str = "100";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    secret_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Whether to require livemode events in production.
    require_livemode: bool,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(secret_key: SecretString, webhook_secret: SecretString) -> Self {
        Self {
            secret_key,
            webhook_secret,
            api_base_url: "https://api.stripe.com".to_string(),
            require_livemode: false,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Require livemode events in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe payment provider adapter.
///
/// Implements `PaymentProvider` for Stripe API integration.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Verify webhook signature using HMAC-SHA256.
    ///
    /// # Security
    ///
    /// - Uses constant-time comparison to prevent timing attacks
    /// - Validates timestamp to prevent replay attacks
    fn verify_signature(&self, payload: &[u8], header: &SignatureHeader) -> Result<(), PaymentError> {
        // 1. Validate timestamp (prevent replay attacks)
        let now = chrono::Utc::now().timestamp();
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        // 2. Compute expected signature
        let signed_payload = format!(
            "{}.{}",
            header.timestamp,
            String::from_utf8_lossy(payload)
        );

        let mut mac = HmacSha256::new_from_slice(
            self.config.webhook_secret.expose_secret().as_bytes(),
        )
        .expect("HMAC can take key of any size");

        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        // 3. Constant-time comparison
        let expected_bytes: &[u8] = expected.as_slice();
        let provided_bytes: &[u8] = &header.v1_signature;

        if expected_bytes.ct_eq(provided_bytes).unwrap_u8() != 1 {
            tracing::warn!(
                expected_signature = hex_encode(expected_bytes),
                "Invalid webhook signature"
            );
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Map a non-success Stripe response to a `PaymentError`.
    async fn response_error(&self, method: &str, response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(method, status = %status, error = %error_text, "Stripe API call failed");

        let code = match status {
            reqwest::StatusCode::UNAUTHORIZED => PaymentErrorCode::AuthenticationError,
            reqwest::StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
            _ => PaymentErrorCode::ProviderError,
        };

        PaymentError::new(code, format!("Stripe API error: {}", error_text))
    }

    /// Decode a Stripe JSON response body.
    async fn decode_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PaymentError> {
        response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })
    }

    /// POST a form-encoded request to a Stripe endpoint.
    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, PaymentError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.response_error(path, response).await);
        }

        Self::decode_body(response).await
    }

    /// GET a Stripe endpoint, mapping 404 to `None`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, PaymentError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .query(query)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(self.response_error(path, response).await);
        }

        Ok(Some(Self::decode_body(response).await?))
    }

    /// DELETE a Stripe endpoint, discarding the response body.
    async fn delete(&self, path: &str) -> Result<(), PaymentError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .delete(&url)
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.response_error(path, response).await);
        }

        Ok(())
    }

    /// Convert a Stripe subscription to the port type.
    ///
    /// Subscriptions created through checkout always carry exactly one item.
    fn map_subscription(sub: StripeSubscription) -> Result<Subscription, PaymentError> {
        let item = sub.items.data.into_iter().next().ok_or_else(|| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Subscription {} has no items", sub.id),
            )
        })?;

        Ok(Subscription {
            id: sub.id,
            customer_id: sub.customer,
            status: sub.status,
            item_id: item.id,
            price_id: item.price.id,
            quantity: item.quantity,
            cancel_at_period_end: sub.cancel_at_period_end,
            trial_end: sub.trial_end,
            current_period_end: sub.current_period_end,
            metadata: sub.metadata,
        })
    }

    fn map_checkout_session(session: StripeCheckoutSession) -> CheckoutSession {
        let url = session
            .url
            .unwrap_or_else(|| format!("https://checkout.stripe.com/c/pay/{}", session.id));

        CheckoutSession {
            id: session.id,
            url,
            status: session.status,
            expires_at: session.expires_at,
        }
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let mut params = vec![
            ("email".to_string(), request.email.clone()),
            (
                "metadata[internal_user_id]".to_string(),
                request.user_id.to_string(),
            ),
        ];

        if let Some(name) = &request.name {
            params.push(("name".to_string(), name.clone()));
        }

        let stripe_customer: StripeCustomer = self.post_form("/v1/customers", &params).await?;

        Ok(Customer {
            id: stripe_customer.id,
            email: stripe_customer.email.unwrap_or(request.email),
            name: stripe_customer.name.or(request.name),
        })
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>, PaymentError> {
        let path = format!("/v1/customers/{}", customer_id);
        let Some(stripe_customer) = self.get_json::<StripeCustomer>(&path, &[]).await? else {
            return Ok(None);
        };

        if stripe_customer.deleted {
            return Ok(None);
        }

        Ok(Some(Customer {
            id: stripe_customer.id,
            email: stripe_customer.email.unwrap_or_default(),
            name: stripe_customer.name,
        }))
    }

    async fn delete_customer(&self, customer_id: &str) -> Result<(), PaymentError> {
        self.delete(&format!("/v1/customers/{}", customer_id)).await
    }

    async fn list_active_products(&self) -> Result<Vec<ProviderProduct>, PaymentError> {
        let list: StripeList<StripeProduct> = self
            .get_json("/v1/products", &[("active", "true"), ("limit", LIST_PAGE_LIMIT)])
            .await?
            .ok_or_else(|| PaymentError::not_found("Product list"))?;

        if list.has_more {
            tracing::warn!("Product catalog exceeds one page; truncating");
        }

        Ok(list
            .data
            .into_iter()
            .map(|p| ProviderProduct {
                id: p.id,
                name: p.name,
                description: p.description.unwrap_or_default(),
                metadata: p.metadata,
            })
            .collect())
    }

    async fn list_active_prices(&self) -> Result<Vec<ProviderPrice>, PaymentError> {
        let list: StripeList<StripePrice> = self
            .get_json("/v1/prices", &[("active", "true"), ("limit", LIST_PAGE_LIMIT)])
            .await?
            .ok_or_else(|| PaymentError::not_found("Price list"))?;

        if list.has_more {
            tracing::warn!("Price catalog exceeds one page; truncating");
        }

        Ok(list
            .data
            .into_iter()
            .map(|p| ProviderPrice {
                id: p.id,
                product_id: p.product,
                unit_amount: p.unit_amount.unwrap_or_default(),
                currency: p.currency,
                metadata: p.metadata,
            })
            .collect())
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut params = vec![
            ("mode".to_string(), "subscription".to_string()),
            ("customer".to_string(), request.customer_id),
            ("line_items[0][price]".to_string(), request.price_id),
            (
                "line_items[0][quantity]".to_string(),
                request.quantity.to_string(),
            ),
            ("success_url".to_string(), request.success_url),
            ("cancel_url".to_string(), request.cancel_url),
        ];

        if let Some(days) = request.trial_period_days {
            params.push((
                "subscription_data[trial_period_days]".to_string(),
                days.to_string(),
            ));
        }

        for (key, value) in request.subscription_metadata {
            params.push((format!("subscription_data[metadata][{}]", key), value));
        }

        let session: StripeCheckoutSession =
            self.post_form("/v1/checkout/sessions", &params).await?;

        Ok(Self::map_checkout_session(session))
    }

    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<CheckoutSession>, PaymentError> {
        let path = format!("/v1/checkout/sessions/{}", session_id);
        let session = self.get_json::<StripeCheckoutSession>(&path, &[]).await?;
        Ok(session.map(Self::map_checkout_session))
    }

    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), PaymentError> {
        let path = format!("/v1/checkout/sessions/{}/expire", session_id);
        let _: StripeCheckoutSession = self.post_form(&path, &[]).await?;
        Ok(())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        let params = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("return_url".to_string(), return_url.to_string()),
        ];

        let portal: StripePortalSession =
            self.post_form("/v1/billing_portal/sessions", &params).await?;

        Ok(PortalSession {
            id: portal.id,
            url: portal.url,
        })
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Subscription>, PaymentError> {
        let path = format!("/v1/subscriptions/{}", subscription_id);
        let Some(stripe_sub) = self.get_json::<StripeSubscription>(&path, &[]).await? else {
            return Ok(None);
        };

        Ok(Some(Self::map_subscription(stripe_sub)?))
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), PaymentError> {
        self.delete(&format!("/v1/subscriptions/{}", subscription_id))
            .await
    }

    async fn update_subscription_quantity(
        &self,
        subscription_id: &str,
        quantity: u32,
    ) -> Result<Subscription, PaymentError> {
        // The item ID is needed to target the quantity change.
        let current = self
            .get_subscription(subscription_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Subscription"))?;

        let params = vec![
            ("items[0][id]".to_string(), current.item_id),
            ("items[0][quantity]".to_string(), quantity.to_string()),
        ];

        let path = format!("/v1/subscriptions/{}", subscription_id);
        let stripe_sub: StripeSubscription = self.post_form(&path, &params).await?;

        Self::map_subscription(stripe_sub)
    }

    async fn update_subscription_price(
        &self,
        request: UpdateSubscriptionPriceRequest,
    ) -> Result<Subscription, PaymentError> {
        let mut params = vec![
            ("items[0][id]".to_string(), request.item_id),
            ("items[0][price]".to_string(), request.price_id),
            ("cancel_at_period_end".to_string(), "false".to_string()),
            (
                "proration_behavior".to_string(),
                "create_prorations".to_string(),
            ),
        ];

        for (key, value) in request.metadata {
            params.push((format!("metadata[{}]", key), value));
        }

        let path = format!("/v1/subscriptions/{}", request.subscription_id);
        let stripe_sub: StripeSubscription = self.post_form(&path, &params).await?;

        Self::map_subscription(stripe_sub)
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, PaymentError> {
        // 1. Parse signature header
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        // 2. Verify signature (includes timestamp validation)
        self.verify_signature(payload, &header)?;

        // 3. Decode the event envelope
        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        if self.config.require_livemode && !stripe_event.livemode {
            tracing::warn!(
                event_id = %stripe_event.id,
                "Rejected test mode event in production"
            );
            return Err(PaymentError::invalid_webhook(
                "Test mode events not allowed in production",
            ));
        }

        tracing::info!(
            event_id = %stripe_event.id,
            event_type = %stripe_event.event_type,
            "Webhook signature verified"
        );

        Ok(ProviderEvent {
            id: stripe_event.id,
            event_type: stripe_event.event_type,
            created: stripe_event.created,
            payload: stripe_event.data.object,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StripeConfig {
        StripeConfig::new(
            SecretString::new("sk_test_key".to_string()),
            SecretString::new("whsec_test_secret".to_string()),
        )
    }

    fn create_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        let signed_payload = format!("{}.{}", timestamp, payload);
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        let result = mac.finalize().into_bytes();

        format!("t={},v1={}", timestamp, hex_encode(&result))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = test_config();
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert!(!config.require_livemode);
    }

    #[test]
    fn config_with_base_url() {
        let config = test_config().with_base_url("http://localhost:8080");
        assert_eq!(config.api_base_url, "http://localhost:8080");
    }

    #[test]
    fn config_with_require_livemode() {
        let config = test_config().with_require_livemode(true);
        assert!(config.require_livemode);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn verify_signature_valid() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        let header = SignatureHeader::parse(&signature).unwrap();
        let result = adapter.verify_signature(payload.as_bytes(), &header);

        assert!(result.is_ok());
    }

    #[test]
    fn verify_signature_invalid() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();

        // Create signature with wrong secret
        let signature = create_test_signature("wrong_secret", timestamp, payload);

        let header = SignatureHeader::parse(&signature).unwrap();
        let result = adapter.verify_signature(payload.as_bytes(), &header);

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err().code,
            PaymentErrorCode::InvalidWebhook
        ));
    }

    #[test]
    fn verify_signature_expired_timestamp() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let old_timestamp = chrono::Utc::now().timestamp() - 600; // 10 minutes ago

        let signature = create_test_signature("whsec_test_secret", old_timestamp, payload);

        let header = SignatureHeader::parse(&signature).unwrap();
        let result = adapter.verify_signature(payload.as_bytes(), &header);

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.message.contains("too old"));
    }

    #[test]
    fn verify_signature_future_timestamp() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let future_timestamp = chrono::Utc::now().timestamp() + 120; // 2 minutes in future

        let signature = create_test_signature("whsec_test_secret", future_timestamp, payload);

        let header = SignatureHeader::parse(&signature).unwrap();
        let result = adapter.verify_signature(payload.as_bytes(), &header);

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.message.contains("future"));
    }

    #[test]
    fn verify_signature_small_future_tolerance() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        // 30 seconds in future should be tolerated
        let timestamp = chrono::Utc::now().timestamp() + 30;

        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        let header = SignatureHeader::parse(&signature).unwrap();
        let result = adapter.verify_signature(payload.as_bytes(), &header);

        assert!(result.is_ok());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn map_subscription_takes_first_item() {
        let json = r#"{
            "id": "sub_test",
            "customer": "cus_test",
            "status": "active",
            "current_period_end": 1706745600,
            "cancel_at_period_end": false,
            "metadata": {"internal_user_id": "7"},
            "items": {
                "data": [
                    {
                        "id": "si_first",
                        "price": {"id": "price_1", "product": "prod_1", "unit_amount": 900, "currency": "usd"},
                        "quantity": 4
                    }
                ]
            }
        }"#;

        let stripe_sub: StripeSubscription = serde_json::from_str(json).unwrap();
        let sub = StripePaymentAdapter::map_subscription(stripe_sub).unwrap();

        assert_eq!(sub.item_id, "si_first");
        assert_eq!(sub.price_id, "price_1");
        assert_eq!(sub.quantity, 4);
        assert_eq!(sub.metadata.get("internal_user_id").unwrap(), "7");
    }

    #[test]
    fn map_subscription_without_items_fails() {
        let json = r#"{
            "id": "sub_empty",
            "customer": "cus_test",
            "status": "active"
        }"#;

        let stripe_sub: StripeSubscription = serde_json::from_str(json).unwrap();
        let result = StripePaymentAdapter::map_subscription(stripe_sub);

        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("no items"));
    }

    #[test]
    fn map_checkout_session_falls_back_to_hosted_url() {
        let session = StripeCheckoutSession {
            id: "cs_abc".to_string(),
            url: None,
            status: "open".to_string(),
            expires_at: 1704153600,
            customer: None,
            subscription: None,
        };

        let mapped = StripePaymentAdapter::map_checkout_session(session);
        assert!(mapped.url.ends_with("cs_abc"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Verification Tests (full flow)
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn verify_webhook_valid_signature_and_payload() {
        let adapter = StripePaymentAdapter::new(test_config());

        let payload = r#"{
            "id": "evt_test123",
            "type": "customer.subscription.updated",
            "created": 1704067200,
            "data": {
                "object": {
                    "id": "sub_test",
                    "customer": "cus_test",
                    "status": "active"
                }
            },
            "livemode": false,
            "pending_webhooks": 0
        }"#;

        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        let result = adapter.verify_webhook(payload.as_bytes(), &signature).await;

        assert!(result.is_ok());
        let event = result.unwrap();
        assert_eq!(event.id, "evt_test123");
        assert_eq!(event.event_type, "customer.subscription.updated");
        assert_eq!(event.payload["customer"], "cus_test");
    }

    #[tokio::test]
    async fn verify_webhook_rejects_invalid_signature() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let signature = "t=1704067200,v1=aabbccdd";

        let result = adapter.verify_webhook(payload.as_bytes(), signature).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn verify_webhook_rejects_malformed_header() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let signature = "malformed_header";

        let result = adapter.verify_webhook(payload.as_bytes(), signature).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn verify_webhook_rejects_invalid_json() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = "not valid json";
        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        let result = adapter.verify_webhook(payload.as_bytes(), &signature).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn verify_webhook_rejects_test_mode_when_livemode_required() {
        let config = test_config().with_require_livemode(true);
        let adapter = StripePaymentAdapter::new(config);

        let payload = r#"{
            "id": "evt_test",
            "type": "customer.subscription.updated",
            "created": 1704067200,
            "data": {"object": {}},
            "livemode": false,
            "pending_webhooks": 0
        }"#;

        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        let result = adapter.verify_webhook(payload.as_bytes(), &signature).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("Test mode"));
    }
}
