//! Runtime error types.

use switchboard_core::BoxError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while starting or running the controller.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// No linked config manager has the configured name.
    #[error("Config manager '{0}' not found")]
    ConfigManagerNotFound(String),

    /// The config manager failed to prepare or answer a query.
    #[error("Config manager error: {0}")]
    ConfigManager(#[source] BoxError),

    /// Loading the configuration file failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
