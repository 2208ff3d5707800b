//! Product catalog, mirrored from the payment provider.
//!
//! The provider is the source of truth for products and prices; their
//! metadata carries the internal product IDs, billing terms, trial
//! lengths, upgrade allow-lists, and redirect slugs. The catalog is
//! loaded lazily once per process and never invalidated; catalog edits
//! at the provider take effect on restart.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::ports::{PaymentError, PaymentProvider, ProviderPrice, ProviderProduct};
use super::payment_event::META_PRODUCT_ID;

/// Price metadata key naming the billing term.
const META_PRICE_TERM: &str = "payment_term";
/// Price metadata key for the trial length in days.
const META_TRIAL_DAYS: &str = "trial_period_days";
/// Price metadata key holding the upgrade allow-list.
const META_UPSELLS: &str = "upsells";
/// Price metadata keys for checkout redirect slugs.
const META_SUCCESS_SLUG: &str = "success_slug";
const META_CANCEL_SLUG: &str = "cancel_slug";

/// A (product, term) pair a price may be upgraded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellTarget {
    pub product_id: String,
    pub payment_term: String,
}

/// One purchasable price under a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    /// Provider price ID.
    pub price_id: String,

    /// Amount in the smallest currency unit.
    pub unit_amount: i64,

    /// Free trial length, if the price offers one.
    pub trial_period_days: Option<u32>,

    /// (product, term) pairs this price may be upgraded to.
    pub upsells: Vec<UpsellTarget>,

    /// Absolute checkout redirect URLs, slugs joined onto the site base.
    pub success_url: String,
    pub cancel_url: String,
}

impl PricingEntry {
    /// True if the allow-list permits upgrading to the given target.
    pub fn allows_upgrade_to(&self, product_id: &str, payment_term: &str) -> bool {
        self.upsells
            .iter()
            .any(|u| u.product_id == product_id && u.payment_term == payment_term)
    }
}

/// A product and its prices, keyed by billing term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEntry {
    /// Provider product ID.
    pub provider_product_id: String,

    /// Product name at the provider.
    pub name: String,

    /// Product description at the provider.
    pub description: String,

    /// Prices keyed by billing term ("monthly", "annual", ...).
    pub pricing: HashMap<String, PricingEntry>,
}

/// The full catalog, keyed by internal product ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalog {
    pub products: HashMap<String, ProductEntry>,
}

impl ProductCatalog {
    /// An empty catalog, used when the provider listing is unavailable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a product by internal ID.
    pub fn product(&self, product_id: &str) -> Option<&ProductEntry> {
        self.products.get(product_id)
    }

    /// Look up a price by internal product ID and billing term.
    pub fn pricing(&self, product_id: &str, payment_term: &str) -> Option<&PricingEntry> {
        self.products
            .get(product_id)
            .and_then(|p| p.pricing.get(payment_term))
    }

    /// Build the catalog from provider listings.
    ///
    /// Products without an internal ID in their metadata are skipped, as
    /// are prices whose product is unknown or whose metadata names no
    /// billing term. Redirect slugs join onto `site_base_url`.
    pub fn from_listings(
        products: Vec<ProviderProduct>,
        prices: Vec<ProviderPrice>,
        site_base_url: &str,
    ) -> Self {
        let mut by_provider_id: HashMap<String, String> = HashMap::new();
        let mut catalog = ProductCatalog::default();

        for product in products {
            let Some(internal_id) = product.metadata.get(META_PRODUCT_ID) else {
                continue;
            };
            by_provider_id.insert(product.id.clone(), internal_id.clone());
            catalog.products.insert(
                internal_id.clone(),
                ProductEntry {
                    provider_product_id: product.id,
                    name: product.name,
                    description: product.description,
                    pricing: HashMap::new(),
                },
            );
        }

        for price in prices {
            let Some(internal_id) = by_provider_id.get(&price.product_id) else {
                continue;
            };
            let Some(term) = price.metadata.get(META_PRICE_TERM) else {
                continue;
            };
            let entry = PricingEntry {
                price_id: price.id,
                unit_amount: price.unit_amount,
                trial_period_days: price
                    .metadata
                    .get(META_TRIAL_DAYS)
                    .and_then(|d| d.trim().parse().ok()),
                upsells: parse_upsells(price.metadata.get(META_UPSELLS).map(String::as_str)),
                success_url: join_url(
                    site_base_url,
                    price.metadata.get(META_SUCCESS_SLUG).map(String::as_str),
                ),
                cancel_url: join_url(
                    site_base_url,
                    price.metadata.get(META_CANCEL_SLUG).map(String::as_str),
                ),
            };
            if let Some(product) = catalog.products.get_mut(internal_id) {
                product.pricing.insert(term.clone(), entry);
            }
        }

        catalog
    }
}

/// Parse the "prod/term prod/term" allow-list format.
fn parse_upsells(raw: Option<&str>) -> Vec<UpsellTarget> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split_whitespace()
        .filter_map(|pair| {
            let (product, term) = pair.split_once('/')?;
            if product.is_empty() || term.is_empty() {
                return None;
            }
            Some(UpsellTarget {
                product_id: product.to_string(),
                payment_term: term.to_string(),
            })
        })
        .collect()
}

fn join_url(base: &str, slug: Option<&str>) -> String {
    let slug = slug.unwrap_or("");
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        slug.trim_start_matches('/')
    )
}

/// Process-scoped lazy catalog.
///
/// The first request that needs the catalog loads it from the provider;
/// all later requests share the same snapshot. A failed load is not
/// remembered, so the next request retries.
pub struct CatalogCache {
    provider: Arc<dyn PaymentProvider>,
    site_base_url: String,
    cell: OnceCell<ProductCatalog>,
}

impl CatalogCache {
    pub fn new(provider: Arc<dyn PaymentProvider>, site_base_url: impl Into<String>) -> Self {
        Self {
            provider,
            site_base_url: site_base_url.into(),
            cell: OnceCell::new(),
        }
    }

    /// Get the catalog, loading it on first use.
    pub async fn get(&self) -> Result<&ProductCatalog, PaymentError> {
        self.cell
            .get_or_try_init(|| async {
                let products = self.provider.list_active_products().await?;
                let prices = self.provider.list_active_prices().await?;
                Ok(ProductCatalog::from_listings(
                    products,
                    prices,
                    &self.site_base_url,
                ))
            })
            .await
    }
}
