//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use optima_core::{OptimaError, OptimaResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Environment variable selecting the environment-specific config file.
pub const ENVIRONMENT_VAR: &str = "OPTIMA_ENVIRONMENT";

/// Loads configuration once at startup and hands out a shared, read-only view.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Arc<AppConfig>,
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `{dir}/default.toml` - Default values
    /// 2. `{dir}/{environment}.toml` - Environment-specific overrides
    /// 3. `{dir}/local.toml` - Local overrides
    /// 4. Environment variables such as `OPTIMA__CACHE__BACKEND=memory`
    ///
    /// The result is validated; any violation aborts loading.
    pub fn new(config_dir: impl Into<PathBuf>) -> OptimaResult<Self> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(config),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> OptimaResult<Self> {
        Self::new("./config")
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn get(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// Returns the directory configuration was read from.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn load_config(config_dir: &Path) -> OptimaResult<AppConfig> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = config_dir.join(format!("{}.toml", name));
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("OPTIMA")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_optima_error)?;
        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_optima_error)?;

        if let Err(errors) = ConfigValidator::validate(&app_config) {
            return Err(OptimaError::Configuration(format_validation_errors(&errors)));
        }

        if app_config.fault_injection.enabled {
            warn!(
                every_nth_call = app_config.fault_injection.every_nth_call,
                delay_ms = app_config.fault_injection.delay_ms,
                "Fault injection is enabled"
            );
        }

        Ok(app_config)
    }
}

fn config_error_to_optima_error(err: ConfigError) -> OptimaError {
    OptimaError::Configuration(err.to_string())
}
