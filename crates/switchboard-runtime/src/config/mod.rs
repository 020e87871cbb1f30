//! Configuration for the Switchboard runtime.
//!
//! The configuration file is layered with figment ([`ConfigLoader`]); the
//! server and plugin sections are then served through a pluggable
//! [`ConfigManager`].

pub mod error;
pub mod loader;
pub mod manager;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use manager::{
    CONFIG_MANAGERS, ConfigManager, ConfigManagerDescriptor, FileConfigManager,
    build_config_manager,
};
pub use schema::{
    CoreConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig, SwitchboardConfig,
};
pub use validation::validate_config;
