//! End-to-end purchase lifecycle tests.
//!
//! Exercises the full path a real purchase takes, with in-memory
//! adapters standing in for Postgres, Stripe, and the host CMS:
//!
//! 1. Checkout initiation creates a provider customer, an identity
//!    link, and a pending-session row.
//! 2. The provider's `customer.subscription.created` webhook clears the
//!    pending row, records the subscription ID on the link, and
//!    notifies the host.
//! 3. Subscription data queries resolve through the link to the
//!    provider's live object.
//! 4. Cancellation ends the provider subscription and clears the link's
//!    subscription reference while keeping the customer reference.
//!
//! Alongside the lifecycle, the webhook gates are checked from the
//! outside: spoofed origins and bad signatures never reach the store,
//! and foreign event types are acknowledged without notifying anyone.

use std::collections::HashMap;
use std::sync::Arc;

use tollgate::adapters::events::InMemoryNotificationPublisher;
use tollgate::adapters::host::StaticUserDirectory;
use tollgate::adapters::memory::InMemorySubscriptionStore;
use tollgate::adapters::stripe::MockPaymentProvider;
use tollgate::application::{
    CancelOutcome, CancelSubscriptionCommand, CancelSubscriptionHandler, CheckoutOutcome,
    GetSubscriptionDataHandler, GetSubscriptionDataQuery, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, HandlePaymentWebhookResult, InitiateCheckoutCommand,
    InitiateCheckoutHandler,
};
use tollgate::domain::billing::{
    CatalogCache, DomainEventEmitter, EventValidator, SubscriptionReconciler, WebhookError,
};
use tollgate::domain::foundation::UserId;
use tollgate::ports::{
    HostUser, NotificationPublisher, PaymentProvider, Subscription, SubscriptionStore,
    UserDirectory,
};

// ════════════════════════════════════════════════════════════════════════════
// Test Environment
// ════════════════════════════════════════════════════════════════════════════

/// All wiring a request would get in production, backed by memory.
struct Environment {
    provider: MockPaymentProvider,
    store: Arc<InMemorySubscriptionStore>,
    publisher: Arc<InMemoryNotificationPublisher>,
    catalog: Arc<CatalogCache>,
    directory: Arc<StaticUserDirectory>,
}

impl Environment {
    fn new(known_users: &[i64]) -> Self {
        let provider = MockPaymentProvider::new();
        seed_catalog(&provider);

        let mut directory = StaticUserDirectory::new();
        for id in known_users {
            directory = directory.with_user(HostUser {
                id: UserId::new(*id).unwrap(),
                email: format!("user{}@example.com", id),
                display_name: Some(format!("User {}", id)),
            });
        }

        let provider_arc: Arc<dyn PaymentProvider> = Arc::new(provider.clone());
        let catalog = Arc::new(CatalogCache::new(provider_arc, "https://example.com"));

        Self {
            provider,
            store: Arc::new(InMemorySubscriptionStore::new()),
            publisher: Arc::new(InMemoryNotificationPublisher::new()),
            catalog,
            directory: Arc::new(directory),
        }
    }

    fn provider_arc(&self) -> Arc<dyn PaymentProvider> {
        Arc::new(self.provider.clone())
    }

    fn store_arc(&self) -> Arc<dyn SubscriptionStore> {
        Arc::clone(&self.store) as Arc<dyn SubscriptionStore>
    }

    fn checkout_handler(&self) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(
            self.store_arc(),
            Arc::clone(&self.directory) as Arc<dyn UserDirectory>,
            self.provider_arc(),
            Arc::clone(&self.catalog),
        )
    }

    fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            EventValidator::new("Stripe/1.0"),
            self.provider_arc(),
            SubscriptionReconciler::new(
                self.store_arc(),
                Arc::clone(&self.directory) as Arc<dyn UserDirectory>,
            ),
            DomainEventEmitter::new(
                Arc::clone(&self.publisher) as Arc<dyn NotificationPublisher>
            ),
            Arc::clone(&self.catalog),
        )
    }

    fn cancel_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.store_arc(), self.provider_arc())
    }

    fn subscription_data_handler(&self) -> GetSubscriptionDataHandler {
        GetSubscriptionDataHandler::new(self.store_arc(), self.provider_arc())
    }
}

/// One product, one monthly price, labeled the way the provider catalog
/// is labeled in production.
fn seed_catalog(provider: &MockPaymentProvider) {
    provider.set_catalog(
        vec![tollgate::ports::ProviderProduct {
            id: "prod_1".to_string(),
            name: "SpeedSentry".to_string(),
            description: "Uptime monitoring".to_string(),
            metadata: HashMap::from([(
                "internal_product_id".to_string(),
                "speedsentry".to_string(),
            )]),
        }],
        vec![tollgate::ports::ProviderPrice {
            id: "price_monthly".to_string(),
            product_id: "prod_1".to_string(),
            unit_amount: 2900,
            currency: "usd".to_string(),
            metadata: HashMap::from([
                ("payment_term".to_string(), "monthly".to_string()),
                ("success_slug".to_string(), "/welcome".to_string()),
                ("cancel_slug".to_string(), "/pricing".to_string()),
            ]),
        }],
    );
}

fn webhook_command(event_type: &str, object: serde_json::Value) -> HandlePaymentWebhookCommand {
    let body = serde_json::json!({
        "id": "evt_integration",
        "type": event_type,
        "created": 1704067200,
        "data": {"object": object},
        "livemode": false
    });

    HandlePaymentWebhookCommand {
        payload: serde_json::to_vec(&body).unwrap(),
        signature: Some("t=1704067200,v1=deadbeef".to_string()),
        user_agent: Some("Stripe/1.0 (+https://stripe.com/docs/webhooks)".to_string()),
        content_type: Some("application/json; charset=utf-8".to_string()),
    }
}

fn subscription_object(
    subscription_id: &str,
    customer_id: &str,
    user_id: i64,
) -> serde_json::Value {
    serde_json::json!({
        "id": subscription_id,
        "customer": customer_id,
        "status": "active",
        "cancel_at_period_end": false,
        "metadata": {
            "internal_user_id": user_id.to_string(),
            "internal_product_id": "speedsentry",
            "internal_payment_term": "monthly"
        },
        "items": {"data": [{"id": "si_1", "quantity": 1,
            "price": {"id": "price_monthly", "product": "prod_1"}}]}
    })
}

fn uid(n: i64) -> UserId {
    UserId::new(n).unwrap()
}

// ════════════════════════════════════════════════════════════════════════════
// Purchase Lifecycle
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn purchase_lifecycle_from_checkout_to_cancellation() {
    let env = Environment::new(&[7]);

    // ── Step 1: checkout initiation ──────────────────────────────────────────
    let outcome = env
        .checkout_handler()
        .handle(InitiateCheckoutCommand {
            user_id: uid(7),
            product_id: "speedsentry".to_string(),
            payment_term: "monthly".to_string(),
            quantity: 1,
        })
        .await
        .unwrap();

    let CheckoutOutcome::Redirect { session_id, url } = outcome else {
        panic!("checkout rejected");
    };
    assert!(url.contains(&session_id));

    let link = env.store.link(uid(7)).expect("identity link created");
    let customer_id = link.customer_id.clone().expect("customer assigned");
    assert!(link.subscription_id.is_none());

    let pending = env.store.pending(uid(7)).expect("pending session recorded");
    assert_eq!(pending.session_id, session_id);
    assert_eq!(pending.product_id, "speedsentry");

    // ── Step 2: provider confirms via webhook ────────────────────────────────
    let result = env
        .webhook_handler()
        .handle(webhook_command(
            "customer.subscription.created",
            subscription_object("sub_700", &customer_id, 7),
        ))
        .await
        .unwrap();

    assert_eq!(result, HandlePaymentWebhookResult::Processed);
    assert!(env.store.pending(uid(7)).is_none());

    let link = env.store.link(uid(7)).unwrap();
    assert_eq!(link.subscription_id.as_deref(), Some("sub_700"));
    assert_eq!(link.customer_id.as_deref(), Some(customer_id.as_str()));

    let notifications = env.publisher.notifications_named("subscription-updated");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].user().id, uid(7));
    let payload = serde_json::to_value(&notifications[0]).unwrap();
    assert_eq!(payload["product_id"], "speedsentry");
    assert_eq!(payload["payment_term"], "monthly");
    assert_eq!(payload["raw_event"]["id"], "sub_700");

    // ── Step 3: subscription data resolves through the link ──────────────────
    env.provider.add_subscription(Subscription {
        id: "sub_700".to_string(),
        customer_id: customer_id.clone(),
        status: "active".to_string(),
        item_id: "si_1".to_string(),
        price_id: "price_monthly".to_string(),
        quantity: 1,
        cancel_at_period_end: false,
        trial_end: None,
        current_period_end: 1706745600,
        metadata: HashMap::new(),
    });

    let subscription = env
        .subscription_data_handler()
        .handle(GetSubscriptionDataQuery { user_id: uid(7) })
        .await
        .unwrap()
        .expect("linked subscription found");
    assert_eq!(subscription.id, "sub_700");
    assert_eq!(subscription.status, "active");

    // ── Step 4: cancellation ─────────────────────────────────────────────────
    let outcome = env
        .cancel_handler()
        .handle(CancelSubscriptionCommand { user_id: uid(7) })
        .await
        .unwrap();

    assert_eq!(outcome, CancelOutcome::Canceled);
    assert_eq!(env.provider.subscription("sub_700").unwrap().status, "canceled");

    // The customer reference survives for a later repurchase.
    let link = env.store.link(uid(7)).unwrap();
    assert!(link.subscription_id.is_none());
    assert_eq!(link.customer_id.as_deref(), Some(customer_id.as_str()));
}

#[tokio::test]
async fn second_checkout_blocked_while_subscription_is_live() {
    let env = Environment::new(&[7]);

    env.checkout_handler()
        .handle(InitiateCheckoutCommand {
            user_id: uid(7),
            product_id: "speedsentry".to_string(),
            payment_term: "monthly".to_string(),
            quantity: 1,
        })
        .await
        .unwrap();

    let customer_id = env.store.link(uid(7)).unwrap().customer_id.unwrap();
    env.provider.add_subscription(Subscription {
        id: "sub_700".to_string(),
        customer_id: customer_id.clone(),
        status: "active".to_string(),
        item_id: "si_1".to_string(),
        price_id: "price_monthly".to_string(),
        quantity: 1,
        cancel_at_period_end: false,
        trial_end: None,
        current_period_end: 1706745600,
        metadata: HashMap::new(),
    });
    env.webhook_handler()
        .handle(webhook_command(
            "customer.subscription.created",
            subscription_object("sub_700", &customer_id, 7),
        ))
        .await
        .unwrap();

    let outcome = env
        .checkout_handler()
        .handle(InitiateCheckoutCommand {
            user_id: uid(7),
            product_id: "speedsentry".to_string(),
            payment_term: "monthly".to_string(),
            quantity: 1,
        })
        .await
        .unwrap();

    assert!(matches!(outcome, CheckoutOutcome::Rejected { .. }));
    // The first checkout plus the blocked retry: one session created.
    assert_eq!(env.provider.call_count("create_checkout_session"), 1);
}

// ════════════════════════════════════════════════════════════════════════════
// Invoice Notifications
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn failed_invoice_notifies_host_without_touching_state() {
    let env = Environment::new(&[7]);

    let object = serde_json::json!({
        "id": "in_1",
        "customer": "cus_42",
        "subscription": "sub_700",
        "lines": {"data": [{
            "quantity": 1,
            "metadata": {
                "internal_user_id": "7",
                "internal_product_id": "speedsentry",
                "internal_payment_term": "monthly"
            }
        }]}
    });

    let result = env
        .webhook_handler()
        .handle(webhook_command("invoice.payment_failed", object))
        .await
        .unwrap();

    assert_eq!(result, HandlePaymentWebhookResult::Processed);
    assert!(env.publisher.has_notification("payment-failed"));
    assert!(env.store.link(uid(7)).is_none());
    assert!(env.store.pending(uid(7)).is_none());
}

#[tokio::test]
async fn trial_ending_notice_reaches_host() {
    let env = Environment::new(&[7]);

    let mut object = subscription_object("sub_700", "cus_42", 7);
    object["status"] = serde_json::json!("trialing");
    object["trial_end"] = serde_json::json!(1706745600);

    let result = env
        .webhook_handler()
        .handle(webhook_command("customer.subscription.trial_will_end", object))
        .await
        .unwrap();

    assert_eq!(result, HandlePaymentWebhookResult::Processed);
    assert!(env.publisher.has_notification("subscription-trial-ending"));
}

// ════════════════════════════════════════════════════════════════════════════
// Gates and Drops
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn spoofed_origin_never_reaches_verification() {
    let env = Environment::new(&[7]);

    let mut cmd = webhook_command(
        "customer.subscription.created",
        subscription_object("sub_700", "cus_42", 7),
    );
    cmd.user_agent = Some("Mozilla/5.0".to_string());

    let result = env.webhook_handler().handle(cmd).await;

    assert!(matches!(result, Err(WebhookError::InvalidOrigin)));
    assert!(!env.provider.was_called("verify_webhook"));
    assert_eq!(env.publisher.count(), 0);
}

#[tokio::test]
async fn bad_signature_rejected_before_any_state_change() {
    let env = Environment::new(&[7]);
    env.provider.set_method_error(
        "verify_webhook",
        tollgate::ports::PaymentError::invalid_webhook("signature mismatch"),
    );

    let result = env
        .webhook_handler()
        .handle(webhook_command(
            "customer.subscription.created",
            subscription_object("sub_700", "cus_42", 7),
        ))
        .await;

    assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    assert_eq!(env.publisher.count(), 0);
}

#[tokio::test]
async fn foreign_event_types_acknowledged_silently() {
    let env = Environment::new(&[7]);

    for event_type in ["charge.refunded", "payment_intent.created", "payout.paid"] {
        let result = env
            .webhook_handler()
            .handle(webhook_command(event_type, serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(result, HandlePaymentWebhookResult::Dropped, "{}", event_type);
    }

    assert_eq!(env.publisher.count(), 0);
}

#[tokio::test]
async fn event_for_unknown_user_dropped_not_errored() {
    let env = Environment::new(&[7]);

    // User 99 does not exist in the host directory.
    let result = env
        .webhook_handler()
        .handle(webhook_command(
            "customer.subscription.created",
            subscription_object("sub_700", "cus_42", 99),
        ))
        .await
        .unwrap();

    assert_eq!(result, HandlePaymentWebhookResult::Dropped);
    assert_eq!(env.publisher.count(), 0);
}

// ════════════════════════════════════════════════════════════════════════════
// Redelivery
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn redelivered_confirmation_leaves_state_unchanged() {
    let env = Environment::new(&[7]);

    env.checkout_handler()
        .handle(InitiateCheckoutCommand {
            user_id: uid(7),
            product_id: "speedsentry".to_string(),
            payment_term: "monthly".to_string(),
            quantity: 1,
        })
        .await
        .unwrap();
    let customer_id = env.store.link(uid(7)).unwrap().customer_id.unwrap();

    let cmd = webhook_command(
        "customer.subscription.created",
        subscription_object("sub_700", &customer_id, 7),
    );
    env.webhook_handler().handle(cmd.clone()).await.unwrap();
    env.webhook_handler().handle(cmd).await.unwrap();

    let link = env.store.link(uid(7)).unwrap();
    assert_eq!(link.subscription_id.as_deref(), Some("sub_700"));
    assert!(env.store.pending(uid(7)).is_none());
    // Each delivery notifies; deduplication is the host's concern.
    assert_eq!(
        env.publisher.notifications_named("subscription-updated").len(),
        2
    );
}
