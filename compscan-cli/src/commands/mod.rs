//! Command handlers -- one module per subcommand

pub mod config;
pub mod rules;
pub mod scan;

use std::path::Path;

use tracing::info;

use compscan_core::config::CompscanConfig;
use compscan_core::error::{CompscanError, ConfigError};

/// Load the configuration used by `scan` and `rules`.
///
/// A missing file falls back to defaults with environment overrides applied;
/// `config validate` and `config show` use the strict loader instead.
pub async fn load_effective_config(path: &Path) -> Result<CompscanConfig, CompscanError> {
    match CompscanConfig::load(path).await {
        Ok(config) => Ok(config),
        Err(CompscanError::Config(ConfigError::FileNotFound { path })) => {
            info!(path = %path, "config file not found, using defaults");
            let mut config = CompscanConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e),
    }
}
