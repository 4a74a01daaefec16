use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CREATORHUB__` and TOML config files.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_instance_id")]
    pub instance_id: String,
    #[serde(default)]
    pub funnel: FunnelConfig,
    #[serde(default)]
    pub features: FeatureFlags,
}

/// Tunables for the funnel aggregation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct FunnelConfig {
    /// How long an actor may sit on a stage before counting as stuck.
    #[serde(default = "default_staleness_window_days")]
    pub staleness_window_days: i64,
    /// Hard cap on returned stuck actors, to bound response size.
    #[serde(default = "default_stuck_result_cap")]
    pub stuck_result_cap: usize,
    /// Offset of the learner "return" window from the query start, in days.
    #[serde(default = "default_return_window_offset_days")]
    pub return_window_offset_days: i64,
    /// Length of the learner "return" window, in days.
    #[serde(default = "default_return_window_length_days")]
    pub return_window_length_days: i64,
}

/// Rollout flags for the hybrid product catalog. Resolved once at composition
/// time and threaded through constructors, never read from global state.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeatureFlags {
    #[serde(default = "default_legacy_courses_enabled")]
    pub legacy_courses_enabled: bool,
    #[serde(default = "default_use_new_marketplace")]
    pub use_new_marketplace: bool,
    #[serde(default = "default_unified_product_model")]
    pub unified_product_model: bool,
    #[serde(default = "default_parallel_system_run")]
    pub parallel_system_run: bool,
}

// Default functions
fn default_instance_id() -> String {
    "hub-01".to_string()
}
fn default_staleness_window_days() -> i64 {
    7
}
fn default_stuck_result_cap() -> usize {
    10
}
fn default_return_window_offset_days() -> i64 {
    7
}
fn default_return_window_length_days() -> i64 {
    7
}
fn default_legacy_courses_enabled() -> bool {
    true
}
fn default_use_new_marketplace() -> bool {
    false
}
fn default_unified_product_model() -> bool {
    false
}
fn default_parallel_system_run() -> bool {
    false
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            staleness_window_days: default_staleness_window_days(),
            stuck_result_cap: default_stuck_result_cap(),
            return_window_offset_days: default_return_window_offset_days(),
            return_window_length_days: default_return_window_length_days(),
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            legacy_courses_enabled: default_legacy_courses_enabled(),
            use_new_marketplace: default_use_new_marketplace(),
            unified_product_model: default_unified_product_model(),
            parallel_system_run: default_parallel_system_run(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instance_id: default_instance_id(),
            funnel: FunnelConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CREATORHUB")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
