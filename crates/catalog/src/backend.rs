use creatorhub_core::HubResult;

use crate::types::Product;

/// Storage seam shared by the legacy course system and the new marketplace.
///
/// Reads never mutate state. Writes a backend does not support yet return
/// `HubError::NotYetSupported` as a typed outcome rather than panicking.
pub trait ProductBackend {
    fn name(&self) -> &'static str;

    fn get(&self, product_id: &str) -> HubResult<Option<Product>>;

    fn list_for_tenant(&self, tenant_id: &str) -> HubResult<Vec<Product>>;

    fn create(&self, product: Product) -> HubResult<Product>;

    fn update_price(&self, product_id: &str, price_cents: u64) -> HubResult<Product>;

    fn publish(&self, product_id: &str) -> HubResult<Product>;

    fn archive(&self, product_id: &str) -> HubResult<()>;
}
