//! Legacy course backend. Courses only; full CRUD.

use chrono::Utc;
use creatorhub_core::{HubError, HubResult};
use dashmap::DashMap;
use tracing::info;

use crate::backend::ProductBackend;
use crate::types::{Product, ProductKind, ProductStatus};

pub struct LegacyCourseStore {
    courses: DashMap<String, Product>,
}

impl Default for LegacyCourseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyCourseStore {
    pub fn new() -> Self {
        Self {
            courses: DashMap::new(),
        }
    }

    fn update_with(
        &self,
        product_id: &str,
        apply: impl FnOnce(&mut Product),
    ) -> HubResult<Product> {
        let mut entry = self
            .courses
            .get_mut(product_id)
            .ok_or_else(|| HubError::ProductNotFound(product_id.to_string()))?;
        apply(entry.value_mut());
        entry.value_mut().updated_at = Utc::now();
        Ok(entry.value().clone())
    }
}

impl ProductBackend for LegacyCourseStore {
    fn name(&self) -> &'static str {
        "legacy_courses"
    }

    fn get(&self, product_id: &str) -> HubResult<Option<Product>> {
        Ok(self.courses.get(product_id).map(|p| p.value().clone()))
    }

    fn list_for_tenant(&self, tenant_id: &str) -> HubResult<Vec<Product>> {
        Ok(self
            .courses
            .iter()
            .filter(|p| p.value().tenant_id == tenant_id)
            .map(|p| p.value().clone())
            .collect())
    }

    fn create(&self, product: Product) -> HubResult<Product> {
        if product.kind != ProductKind::Course {
            return Err(HubError::Validation(format!(
                "legacy backend only stores courses, got {:?}",
                product.kind
            )));
        }
        info!(product_id = %product.id, tenant_id = %product.tenant_id, "Course created");
        self.courses.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    fn update_price(&self, product_id: &str, price_cents: u64) -> HubResult<Product> {
        self.update_with(product_id, |p| p.price_cents = price_cents)
    }

    fn publish(&self, product_id: &str) -> HubResult<Product> {
        self.update_with(product_id, |p| p.status = ProductStatus::Published)
    }

    fn archive(&self, product_id: &str) -> HubResult<()> {
        self.update_with(product_id, |p| p.status = ProductStatus::Archived)?;
        Ok(())
    }
}
