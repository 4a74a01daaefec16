pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, FeatureFlags, FunnelConfig};
pub use error::{HubError, HubResult};
