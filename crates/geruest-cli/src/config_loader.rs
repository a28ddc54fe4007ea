//! Configuration loading and service wiring for CLI commands

use anyhow::{Context, Result};
use geruest_client::{
    AddressClient, DrawingCache, DrawingService, HttpBackend, RequestRegistry, TakeoffService,
};
use geruest_core::config::{CliConfigOverrides, LayeredConfig};
use geruest_core::ports::Backend;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::Cli;

/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "geruest.toml";

/// Load layered configuration: defaults, file, environment, then CLI flags
pub fn load_config(config_path: Option<&Path>, backend_url: Option<String>) -> Result<LayeredConfig> {
    let config = match config_path {
        // An explicit path must exist
        Some(path) => LayeredConfig::with_defaults()
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => LayeredConfig::with_defaults()
            .load_from_optional_file(PathBuf::from(DEFAULT_CONFIG_FILE))
            .context("Failed to load geruest.toml")?,
    };

    let mut config = config.load_from_env();
    config.update_from_cli(CliConfigOverrides { backend_url, ..Default::default() })?;
    Ok(config)
}

/// Backend and services shared by one CLI invocation
pub struct AppContext {
    pub config: LayeredConfig,
    pub backend: Arc<dyn Backend>,
    pub registry: Arc<RequestRegistry>,
    pub cache: Arc<DrawingCache>,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref(), cli.backend_url.clone())?;
        Ok(Self::new(config))
    }

    pub fn new(config: LayeredConfig) -> Self {
        let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(config.backend_url.value.clone()));
        let cache = Arc::new(DrawingCache::new(
            config.cache_capacity.value,
            config.cache_ttl_secs.value.map(Duration::from_secs),
        ));

        tracing::debug!(backend = %config.backend_url.value, "Using backend");
        Self { config, backend, registry: Arc::new(RequestRegistry::new()), cache }
    }

    pub fn addresses(&self) -> AddressClient {
        AddressClient::with_registry(self.backend.clone(), self.registry.clone())
    }

    pub fn takeoffs(&self) -> TakeoffService {
        TakeoffService::with_registry(self.backend.clone(), self.registry.clone())
    }

    pub fn drawings(&self) -> DrawingService {
        DrawingService::new(
            self.backend.clone(),
            self.cache.clone(),
            Duration::from_secs(self.config.drawing_timeout_secs.value),
        )
        .with_registry(self.registry.clone())
    }
}
