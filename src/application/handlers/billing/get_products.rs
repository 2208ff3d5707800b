//! Product catalog query handler.

use std::sync::Arc;

use crate::domain::billing::{CatalogCache, ProductCatalog};
use crate::domain::foundation::{DomainError, ErrorCode};

/// Handler returning the current catalog snapshot.
pub struct GetProductsHandler {
    catalog: Arc<CatalogCache>,
}

impl GetProductsHandler {
    pub fn new(catalog: Arc<CatalogCache>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self) -> Result<ProductCatalog, DomainError> {
        self.catalog
            .get()
            .await
            .map(Clone::clone)
            .map_err(|e| DomainError::new(ErrorCode::PaymentProviderError, e.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::ports::{PaymentProvider, ProviderPrice, ProviderProduct};
    use std::collections::HashMap;

    #[tokio::test]
    async fn returns_catalog_built_from_listings() {
        let provider = MockPaymentProvider::new();
        provider.set_catalog(
            vec![ProviderProduct {
                id: "prod_1".to_string(),
                name: "SpeedSentry".to_string(),
                description: String::new(),
                metadata: HashMap::from([(
                    "internal_product_id".to_string(),
                    "speedsentry".to_string(),
                )]),
            }],
            vec![ProviderPrice {
                id: "price_monthly".to_string(),
                product_id: "prod_1".to_string(),
                unit_amount: 900,
                currency: "usd".to_string(),
                metadata: HashMap::from([("payment_term".to_string(), "monthly".to_string())]),
            }],
        );

        let provider_arc: Arc<dyn PaymentProvider> = Arc::new(provider);
        let handler = GetProductsHandler::new(Arc::new(CatalogCache::new(
            provider_arc,
            "https://example.com",
        )));

        let catalog = handler.handle().await.unwrap();

        assert!(catalog.pricing("speedsentry", "monthly").is_some());
    }
}
