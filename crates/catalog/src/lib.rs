//! Hybrid product catalog — feature-flagged routing between the legacy
//! course system and the new marketplace backend.

pub mod backend;
pub mod legacy;
pub mod marketplace;
pub mod service;
pub mod types;

pub use backend::ProductBackend;
pub use legacy::LegacyCourseStore;
pub use marketplace::MarketplaceStore;
pub use service::ProductService;
pub use types::{Product, ProductKind, ProductStatus, Route};
