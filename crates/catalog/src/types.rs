use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sellable item on a storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: u64,
    pub currency: String,
    /// Discriminant the routing layer dispatches on.
    pub kind: ProductKind,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Legacy-system courses.
    Course,
    /// Marketplace digital downloads (ebooks, templates, assets).
    DigitalDownload,
    /// Marketplace bundles of other products.
    Bundle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Published,
    Archived,
}

/// Which backend a product operation is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Legacy,
    Marketplace,
}
