//! Configuration validation utilities.

use switchboard_transport::{RetryConfig, ServerConfig};

use super::error::{ConfigError, ConfigResult};
use super::schema::SwitchboardConfig;

/// Validates the entire configuration.
pub fn validate_config(config: &SwitchboardConfig) -> ConfigResult<()> {
    if config.core.config_manager.trim().is_empty() {
        return Err(ConfigError::validation("core.config_manager must not be empty"));
    }

    validate_retry_config(&config.retry)?;

    for (name, server) in &config.servers {
        validate_server_config(name, server)?;
    }

    for (name, section) in &config.plugins {
        if !section.is_object() {
            return Err(ConfigError::validation(format!(
                "plugins.{name} must be a table"
            )));
        }
    }

    Ok(())
}

fn validate_retry_config(retry: &RetryConfig) -> ConfigResult<()> {
    if retry.initial_delay.is_zero() {
        return Err(ConfigError::validation(
            "Initial retry delay must be greater than 0",
        ));
    }

    if retry.max_delay < retry.initial_delay {
        return Err(ConfigError::validation(
            "Max retry delay must be greater than or equal to initial delay",
        ));
    }

    if retry.multiplier < 1.0 {
        return Err(ConfigError::validation(
            "Backoff multiplier must be at least 1.0",
        ));
    }

    Ok(())
}

fn validate_server_config(name: &str, server: &ServerConfig) -> ConfigResult<()> {
    if server.hostname.trim().is_empty() {
        return Err(ConfigError::validation(format!(
            "servers.{name}.hostname must not be empty"
        )));
    }

    if server.port == 0 {
        return Err(ConfigError::validation(format!(
            "servers.{name}.port must not be 0"
        )));
    }

    if server.nickname.is_empty() || server.nickname.contains(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "servers.{name}.nickname '{}' is not a valid nickname",
            server.nickname
        )));
    }

    Ok(())
}
