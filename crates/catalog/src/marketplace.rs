//! Marketplace backend. Reads are live; writes are Phase 2 and return
//! `NotYetSupported` until the write path ships.

use creatorhub_core::{HubError, HubResult};
use dashmap::DashMap;

use crate::backend::ProductBackend;
use crate::types::Product;

pub struct MarketplaceStore {
    products: DashMap<String, Product>,
}

impl Default for MarketplaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketplaceStore {
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
        }
    }

    /// Backfill ingestion used by the migration tooling. Not part of the
    /// `ProductBackend` write surface.
    pub fn import(&self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    fn not_yet(operation: &str) -> HubError {
        HubError::NotYetSupported(format!("marketplace {operation}"))
    }
}

impl ProductBackend for MarketplaceStore {
    fn name(&self) -> &'static str {
        "marketplace"
    }

    fn get(&self, product_id: &str) -> HubResult<Option<Product>> {
        Ok(self.products.get(product_id).map(|p| p.value().clone()))
    }

    fn list_for_tenant(&self, tenant_id: &str) -> HubResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.value().tenant_id == tenant_id)
            .map(|p| p.value().clone())
            .collect())
    }

    fn create(&self, _product: Product) -> HubResult<Product> {
        Err(Self::not_yet("product creation"))
    }

    fn update_price(&self, _product_id: &str, _price_cents: u64) -> HubResult<Product> {
        Err(Self::not_yet("price update"))
    }

    fn publish(&self, _product_id: &str) -> HubResult<Product> {
        Err(Self::not_yet("publishing"))
    }

    fn archive(&self, _product_id: &str) -> HubResult<()> {
        Err(Self::not_yet("archival"))
    }
}
