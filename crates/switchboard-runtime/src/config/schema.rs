//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use switchboard_transport::{RetryConfig, ServerConfig};

/// Name of the config manager used when `[core]` does not set one.
pub const DEFAULT_CONFIG_MANAGER: &str = "file";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchboardConfig {
    #[serde(default)]
    pub core: CoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Reconnect backoff shared by every server.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Server sections keyed by server name.
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,

    /// Free-form plugin sections keyed by plugin name.
    #[serde(default)]
    pub plugins: BTreeMap<String, serde_json::Value>,
}

/// `[core]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Which linked config manager serves server and plugin settings.
    #[serde(default = "default_config_manager")]
    pub config_manager: String,
}

fn default_config_manager() -> String {
    DEFAULT_CONFIG_MANAGER.to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            config_manager: default_config_manager(),
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Log file, used when `output = "file"`.
    pub file_path: Option<PathBuf>,
    pub span_events: SpanEventConfig,
    pub thread_ids: bool,
    /// Include source file and line.
    pub file_location: bool,
    /// Per-target levels, e.g. `switchboard_transport = "debug"`.
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            filters: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` without it.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}
