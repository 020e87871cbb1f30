//! Connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Port used when a server section does not set one.
pub const DEFAULT_PORT: u16 = 6667;

/// Nickname used when a server section does not set one.
pub const DEFAULT_NICKNAME: &str = "switchboard";

/// One `[servers.<name>]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_nickname")]
    pub nickname: String,
    /// Ident sent with `USER`; defaults to the nickname.
    #[serde(default)]
    pub username: Option<String>,
    /// Real name sent with `USER`; defaults to the nickname.
    #[serde(default)]
    pub realname: Option<String>,
    /// Server password sent with `PASS`.
    #[serde(default)]
    pub password: Option<String>,
    /// Channels joined once registration completes.
    #[serde(default)]
    pub channels: Vec<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_nickname() -> String {
    DEFAULT_NICKNAME.to_string()
}

impl ServerConfig {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: DEFAULT_PORT,
            nickname: default_nickname(),
            username: None,
            realname: None,
            password: None,
            channels: Vec::new(),
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nickname)
    }

    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nickname)
    }

    /// `host:port` form used for connecting and logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

/// Reconnect backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Consecutive failed attempts before giving up; unlimited when absent.
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(with = "humantime_serde", default = "default_initial_delay")]
    pub initial_delay: Duration,
    #[serde(with = "humantime_serde", default = "default_max_delay")]
    pub max_delay: Duration,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Delay following `current`, capped at `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next = current.as_secs_f64() * self.multiplier.max(1.0);
        Duration::from_secs_f64(next.min(self.max_delay.as_secs_f64()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_server_defaults() {
        let config: ServerConfig =
            serde_json::from_value(json!({ "hostname": "irc.example.org" })).unwrap();
        assert_eq!(config.port, 6667);
        assert_eq!(config.nickname, "switchboard");
        assert_eq!(config.username(), "switchboard");
        assert_eq!(config.realname(), "switchboard");
        assert_eq!(config.address(), "irc.example.org:6667");
        assert!(config.channels.is_empty());
    }

    #[test]
    fn test_retry_parses_human_durations() {
        let retry: RetryConfig = serde_json::from_value(json!({
            "max_retries": 5,
            "initial_delay": "500ms",
            "max_delay": "2s",
        }))
        .unwrap();
        assert_eq!(retry.max_retries, Some(5));
        assert_eq!(retry.initial_delay, Duration::from_millis(500));
        assert_eq!(retry.multiplier, 2.0);
    }

    #[test]
    fn test_backoff_is_capped() {
        let retry = RetryConfig {
            max_delay: Duration::from_secs(3),
            ..RetryConfig::default()
        };
        let mut delay = retry.initial_delay;
        delay = retry.next_delay(delay);
        assert_eq!(delay, Duration::from_secs(2));
        delay = retry.next_delay(delay);
        assert_eq!(delay, Duration::from_secs(3));
        delay = retry.next_delay(delay);
        assert_eq!(delay, Duration::from_secs(3));
    }
}
