//! Hybrid product service: a facade routing each operation to the legacy
//! course system or the new marketplace.
//!
//! Routing is an explicit function of the product's `kind` discriminant and
//! the feature flags resolved at composition time. There is no runtime type
//! probing and no ambient flag state.

use creatorhub_core::config::FeatureFlags;
use creatorhub_core::{HubError, HubResult};
use tracing::{info, warn};

use crate::backend::ProductBackend;
use crate::legacy::LegacyCourseStore;
use crate::marketplace::MarketplaceStore;
use crate::types::{Product, ProductKind, Route};

pub struct ProductService {
    flags: FeatureFlags,
    legacy: LegacyCourseStore,
    marketplace: MarketplaceStore,
}

impl ProductService {
    pub fn new(flags: FeatureFlags) -> Self {
        info!(
            legacy_courses_enabled = flags.legacy_courses_enabled,
            use_new_marketplace = flags.use_new_marketplace,
            unified_product_model = flags.unified_product_model,
            parallel_system_run = flags.parallel_system_run,
            "Product service initialized"
        );
        Self {
            flags,
            legacy: LegacyCourseStore::new(),
            marketplace: MarketplaceStore::new(),
        }
    }

    /// Backend a product of the given kind is served from.
    pub fn route(&self, kind: ProductKind) -> Route {
        if self.flags.unified_product_model {
            return Route::Marketplace;
        }
        match kind {
            ProductKind::Course if self.flags.legacy_courses_enabled => Route::Legacy,
            ProductKind::Course => Route::Marketplace,
            _ => Route::Marketplace,
        }
    }

    pub fn create(&self, product: Product) -> HubResult<Product> {
        if product.kind != ProductKind::Course
            && !self.flags.use_new_marketplace
            && !self.flags.unified_product_model
        {
            return Err(HubError::Validation(format!(
                "marketplace products are not enabled, cannot create {:?}",
                product.kind
            )));
        }
        match self.route(product.kind) {
            Route::Legacy => self.legacy.create(product),
            Route::Marketplace => self.marketplace.create(product),
        }
    }

    pub fn get(&self, product_id: &str) -> HubResult<Option<Product>> {
        if self.flags.parallel_system_run {
            return self.get_parallel(product_id);
        }
        let (primary, secondary): (&dyn ProductBackend, &dyn ProductBackend) =
            if self.flags.unified_product_model {
                (&self.marketplace, &self.legacy)
            } else {
                (&self.legacy, &self.marketplace)
            };
        match primary.get(product_id)? {
            Some(product) => Ok(Some(product)),
            None => secondary.get(product_id),
        }
    }

    /// Shadow-read verification: consult both systems, flag divergence, and
    /// answer from the backend the product's kind routes to.
    fn get_parallel(&self, product_id: &str) -> HubResult<Option<Product>> {
        let legacy_hit = self.legacy.get(product_id)?;
        let marketplace_hit = self.marketplace.get(product_id)?;

        match (legacy_hit, marketplace_hit) {
            (Some(legacy), Some(marketplace)) => {
                if legacy != marketplace {
                    warn!(
                        product_id = %product_id,
                        legacy_price = legacy.price_cents,
                        marketplace_price = marketplace.price_cents,
                        "Parallel-run divergence between legacy and marketplace"
                    );
                }
                Ok(Some(match self.route(legacy.kind) {
                    Route::Legacy => legacy,
                    Route::Marketplace => marketplace,
                }))
            }
            (Some(legacy), None) => Ok(Some(legacy)),
            (None, marketplace) => Ok(marketplace),
        }
    }

    pub fn list_for_tenant(&self, tenant_id: &str) -> HubResult<Vec<Product>> {
        let mut products = self.legacy.list_for_tenant(tenant_id)?;
        if self.flags.use_new_marketplace || self.flags.unified_product_model {
            for product in self.marketplace.list_for_tenant(tenant_id)? {
                let duplicate = products.iter().position(|p| p.id == product.id);
                match (duplicate, self.route(product.kind)) {
                    (Some(i), Route::Marketplace) => products[i] = product,
                    (Some(_), Route::Legacy) => {}
                    (None, _) => products.push(product),
                }
            }
        }
        Ok(products)
    }

    pub fn update_price(&self, product_id: &str, price_cents: u64) -> HubResult<Product> {
        self.dispatch_write(product_id, |backend| {
            backend.update_price(product_id, price_cents)
        })
    }

    pub fn publish(&self, product_id: &str) -> HubResult<Product> {
        self.dispatch_write(product_id, |backend| backend.publish(product_id))
    }

    pub fn archive(&self, product_id: &str) -> HubResult<()> {
        self.dispatch_write(product_id, |backend| backend.archive(product_id))
    }

    fn dispatch_write<R>(
        &self,
        product_id: &str,
        op: impl FnOnce(&dyn ProductBackend) -> HubResult<R>,
    ) -> HubResult<R> {
        let existing = self
            .get(product_id)?
            .ok_or_else(|| HubError::ProductNotFound(product_id.to_string()))?;
        match self.route(existing.kind) {
            Route::Legacy => op(&self.legacy),
            Route::Marketplace => op(&self.marketplace),
        }
    }

    /// Migration and backfill access to the underlying stores.
    pub fn legacy_store(&self) -> &LegacyCourseStore {
        &self.legacy
    }

    pub fn marketplace_store(&self) -> &MarketplaceStore {
        &self.marketplace
    }
}
