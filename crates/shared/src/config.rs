//! Runtime configuration management.

use serde::Deserialize;

/// Runtime configuration for the finance core.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Interest accrual engine configuration.
    #[serde(default)]
    pub accrual: AccrualConfig,
}

/// Interest accrual engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualConfig {
    /// How many times a per-member sweep retries after losing a version
    /// race before surfacing the failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Whether the sweep processes members in parallel.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_parallel() -> bool {
    true
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            parallel: default_parallel(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            accrual: AccrualConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SACCO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
