//! Pluggable config managers.
//!
//! A config manager answers which servers to connect to and what each
//! plugin's settings are. The controller picks one by the name set in
//! `[core] config_manager`, looking it up among the descriptors linked into
//! the [`CONFIG_MANAGERS`] slice. The built-in `"file"` manager serves the
//! loaded configuration file itself.

use std::sync::Arc;

use async_trait::async_trait;
use linkme::distributed_slice;
use switchboard_core::BoxError;
use switchboard_transport::ServerConfig;
use tracing::{debug, warn};

use super::schema::SwitchboardConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// Source of server and plugin settings.
#[async_trait]
pub trait ConfigManager: Send + Sync {
    /// Called once before any other method.
    async fn prepare(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Names of the configured servers.
    async fn enumerate_servers(&self) -> Result<Vec<String>, BoxError>;

    /// Settings of one server, or `None` if it is unknown.
    async fn server_config(&self, server: &str) -> Result<Option<ServerConfig>, BoxError>;

    /// Settings section of one plugin; an empty object when absent.
    async fn plugin_config(&self, plugin: &str) -> Result<serde_json::Value, BoxError>;
}

/// Factory building a config manager from the loaded configuration.
pub type ConfigManagerFactory = fn(&SwitchboardConfig) -> Arc<dyn ConfigManager>;

/// A named, linkable config manager.
#[derive(Debug, Clone, Copy)]
pub struct ConfigManagerDescriptor {
    pub name: &'static str,
    pub create: ConfigManagerFactory,
}

/// Config managers linked into the binary.
#[distributed_slice]
pub static CONFIG_MANAGERS: [ConfigManagerDescriptor];

/// Instantiates the config manager named in `[core]`.
///
/// The first linked descriptor with a matching name wins.
pub fn build_config_manager(config: &SwitchboardConfig) -> RuntimeResult<Arc<dyn ConfigManager>> {
    let name = config.core.config_manager.as_str();
    let descriptor = CONFIG_MANAGERS
        .iter()
        .find(|descriptor| descriptor.name == name)
        .ok_or_else(|| RuntimeError::ConfigManagerNotFound(name.to_string()))?;

    if CONFIG_MANAGERS.iter().filter(|d| d.name == name).count() > 1 {
        warn!(config_manager = name, "Multiple config managers share this name, using the first");
    }

    debug!(config_manager = name, "Config manager selected");
    Ok((descriptor.create)(config))
}

// =============================================================================
// File manager
// =============================================================================

#[distributed_slice(CONFIG_MANAGERS)]
static FILE_CONFIG_MANAGER: ConfigManagerDescriptor = ConfigManagerDescriptor {
    name: "file",
    create: FileConfigManager::create,
};

/// Serves `[servers]` and `[plugins]` from the loaded configuration.
pub struct FileConfigManager {
    config: SwitchboardConfig,
}

impl FileConfigManager {
    pub fn new(config: SwitchboardConfig) -> Self {
        Self { config }
    }

    fn create(config: &SwitchboardConfig) -> Arc<dyn ConfigManager> {
        Arc::new(Self::new(config.clone()))
    }
}

#[async_trait]
impl ConfigManager for FileConfigManager {
    async fn enumerate_servers(&self) -> Result<Vec<String>, BoxError> {
        Ok(self.config.servers.keys().cloned().collect())
    }

    async fn server_config(&self, server: &str) -> Result<Option<ServerConfig>, BoxError> {
        Ok(self.config.servers.get(server).cloned())
    }

    async fn plugin_config(&self, plugin: &str) -> Result<serde_json::Value, BoxError> {
        Ok(self
            .config
            .plugins
            .get(plugin)
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default())))
    }
}
