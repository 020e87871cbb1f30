//! Switchboard Runtime - Orchestration layer for the Switchboard bot framework.
//!
//! This crate provides:
//! - Layered configuration loading and pluggable config managers
//! - The [`Controller`] that loads plugins and runs server connections
//! - Logging configuration
//!
//! ```ignore
//! use switchboard_runtime::{Controller, load_config, logging};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     logging::init_from_config(&config.logging);
//!
//!     // Run until Ctrl+C
//!     Controller::new(config).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! Plugins and config managers are discovered at link time: any crate
//! linked into the binary can add entries to
//! [`PLUGINS`](switchboard_framework::PLUGINS) or [`CONFIG_MANAGERS`].

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;

// Re-exports
pub use config::{
    CONFIG_MANAGERS, ConfigError, ConfigLoader, ConfigManager, ConfigManagerDescriptor,
    ConfigResult, SwitchboardConfig, load_config, load_config_from_file,
};
pub use controller::{Controller, wait_for_signal};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
