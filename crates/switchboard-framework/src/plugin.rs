//! Link-time plugin discovery.
//!
//! Every crate linked into the final binary can contribute plugins by
//! adding a [`PluginDescriptor`] to the [`PLUGINS`] distributed slice. The
//! runtime instantiates each one with its configuration section and
//! registers the resulting handler with the shared
//! [`EventManager`].
//!
//! ```rust,ignore
//! #[distributed_slice(PLUGINS)]
//! static ECHO: PluginDescriptor = PluginDescriptor {
//!     name: "echo",
//!     create: |_ctx| Ok(Arc::new(EchoPlugin)),
//! };
//! ```

use std::sync::{Arc, Weak};

use linkme::distributed_slice;
use serde::de::DeserializeOwned;
use switchboard_core::{BoxError, BoxedHandler, EventManager};
use tracing::{debug, error, info};

/// Factory building a plugin's handler from its load context.
pub type CreateFn = fn(&PluginContext) -> Result<BoxedHandler, BoxError>;

/// A static handle that identifies and instantiates a plugin.
#[derive(Debug, Clone, Copy)]
pub struct PluginDescriptor {
    /// Plugin name, also the key of its configuration section.
    pub name: &'static str,
    /// Factory creating the live handler.
    pub create: CreateFn,
}

/// Plugins linked into the binary.
#[distributed_slice]
pub static PLUGINS: [PluginDescriptor];

/// Context passed to a plugin factory.
#[derive(Clone, Debug)]
pub struct PluginContext {
    name: &'static str,
    events: Weak<EventManager>,
    config: Arc<serde_json::Value>,
}

impl PluginContext {
    pub fn new(name: &'static str, events: &Arc<EventManager>, config: serde_json::Value) -> Self {
        Self {
            name,
            events: Arc::downgrade(events),
            config: Arc::new(config),
        }
    }

    /// Name of the plugin being loaded.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Handle to the event manager, for plugins that emit events.
    ///
    /// The reference is weak because the manager owns every registered
    /// handler.
    pub fn events(&self) -> Weak<EventManager> {
        self.events.clone()
    }

    /// Deserialises the configuration section into `T`.
    ///
    /// Use `#[serde(default)]` on `T` to make every field optional.
    pub fn get_config<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(self.config.as_ref())
    }

    /// Returns `false` when the section sets `enabled = false`.
    pub fn is_enabled(&self) -> bool {
        self.config
            .get("enabled")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true)
    }
}

impl PluginDescriptor {
    /// Instantiates the plugin and registers its handler.
    ///
    /// Returns `true` if a handler was handed to the manager. Disabled
    /// plugins and factory failures are skipped with a log entry.
    pub fn load(&self, events: &Arc<EventManager>, config: serde_json::Value) -> bool {
        let ctx = PluginContext::new(self.name, events, config);
        if !ctx.is_enabled() {
            info!(plugin = self.name, "Plugin disabled by configuration");
            return false;
        }

        match (self.create)(&ctx) {
            Ok(handler) => {
                debug!(plugin = self.name, handler = handler.name(), "Plugin instantiated");
                events.register(handler);
                true
            }
            Err(e) => {
                error!(plugin = self.name, error = %e, "Failed to create plugin");
                false
            }
        }
    }
}
