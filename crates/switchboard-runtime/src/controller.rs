//! Service controller.
//!
//! Startup order:
//!
//! 1. Build the config manager named in `[core]` (fatal if none matches)
//!    and let it prepare.
//! 2. Instantiate every linked plugin with its settings section and
//!    register it with the shared [`EventManager`].
//! 3. Spawn one connection task per configured server.
//!
//! ```rust,ignore
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! Controller::new(config).run().await?;
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use switchboard_core::EventManager;
use switchboard_framework::PLUGINS;
use switchboard_transport::run_server;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigManager, SwitchboardConfig, build_config_manager};
use crate::error::{RuntimeError, RuntimeResult};

/// Owns the event manager, the plugins and the server connections.
pub struct Controller {
    config: SwitchboardConfig,
    events: Arc<EventManager>,
    shutdown: CancellationToken,
    connections: JoinSet<()>,
}

impl Controller {
    pub fn new(config: SwitchboardConfig) -> Self {
        Self {
            config,
            events: Arc::new(EventManager::new()),
            shutdown: CancellationToken::new(),
            connections: JoinSet::new(),
        }
    }

    /// The shared event manager.
    pub fn events(&self) -> &Arc<EventManager> {
        &self.events
    }

    /// Token that stops every connection when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Prepares configuration, loads plugins and spawns connections.
    pub async fn start(&mut self) -> RuntimeResult<()> {
        let manager = build_config_manager(&self.config)?;
        manager.prepare().await.map_err(RuntimeError::ConfigManager)?;

        let loaded = self.load_plugins(manager.as_ref()).await;
        info!(
            plugins = loaded,
            handlers = ?self.events.handler_names(),
            "Plugins loaded"
        );

        let servers = manager
            .enumerate_servers()
            .await
            .map_err(RuntimeError::ConfigManager)?;
        if servers.is_empty() {
            warn!("No server configurations defined");
        }

        for server in servers {
            let config = match manager.server_config(&server).await {
                Ok(Some(config)) => config,
                Ok(None) => {
                    warn!(server = %server, "Server listed without configuration, skipping");
                    continue;
                }
                Err(e) => {
                    error!(server = %server, error = %e, "Failed to read server configuration");
                    continue;
                }
            };

            debug!(server = %server, address = %config.address(), "Starting connection");
            self.connections.spawn(run_server(
                server,
                config,
                self.config.retry.clone(),
                Arc::clone(&self.events),
                self.shutdown.child_token(),
            ));
        }

        Ok(())
    }

    /// Loads every linked plugin; returns how many registered a handler.
    async fn load_plugins(&self, manager: &dyn ConfigManager) -> usize {
        let mut seen = HashSet::new();
        let mut loaded = 0;

        for plugin in PLUGINS.iter() {
            if !seen.insert(plugin.name) {
                warn!(plugin = plugin.name, "Duplicate plugin name, keeping the first");
                continue;
            }

            let settings = match manager.plugin_config(plugin.name).await {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(plugin = plugin.name, error = %e, "Failed to read plugin configuration, using defaults");
                    serde_json::Value::Object(Default::default())
                }
            };

            if plugin.load(&self.events, settings) {
                loaded += 1;
            }
        }

        loaded
    }

    /// Starts and runs until Ctrl+C or SIGTERM.
    pub async fn run(self) -> RuntimeResult<()> {
        self.run_until(wait_for_signal()).await
    }

    /// Starts and runs until `shutdown` completes or every connection ends.
    pub async fn run_until<F>(mut self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        info!(connections = self.connections.len(), "Switchboard running");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                joined = self.connections.join_next() => match joined {
                    Some(Ok(())) => {}
                    Some(Err(e)) => error!(error = %e, "Connection task failed"),
                    None => {
                        info!("All connections have stopped");
                        // Keep serving until asked to stop when nothing was configured.
                        shutdown.as_mut().await;
                        break;
                    }
                },
            }
        }

        self.stop().await;
        Ok(())
    }

    /// Cancels every connection and waits for them to close.
    pub async fn stop(&mut self) {
        info!("Stopping connections");
        self.shutdown.cancel();
        while let Some(joined) = self.connections.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Connection task failed during shutdown");
            }
        }
        info!("Switchboard stopped");
    }
}

/// Waits for Ctrl+C, or SIGTERM on Unix.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                if let Err(e) = signal::ctrl_c().await {
                    error!(error = %e, "Failed to listen for Ctrl+C");
                }
                return;
            }
        };

        tokio::select! {
            _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
        }
        info!("Received Ctrl+C, shutting down");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use switchboard_transport::ServerConfig;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn test_unknown_config_manager_is_fatal() {
        let mut config = SwitchboardConfig::default();
        config.core.config_manager = "sql".to_string();

        let result = Controller::new(config).run_until(async {}).await;

        assert!(matches!(
            result,
            Err(RuntimeError::ConfigManagerNotFound(name)) if name == "sql"
        ));
    }

    #[tokio::test]
    async fn test_start_loads_builtin_plugins_without_servers() {
        let mut controller = Controller::new(SwitchboardConfig::default());
        controller.start().await.unwrap();

        assert!(
            controller
                .events()
                .handler_names()
                .contains(&"command".to_string())
        );
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_disabled_plugin_is_skipped() {
        let mut config = SwitchboardConfig::default();
        config
            .plugins
            .insert("command".to_string(), serde_json::json!({ "enabled": false }));
        let mut controller = Controller::new(config);
        controller.start().await.unwrap();

        assert!(
            !controller
                .events()
                .handler_names()
                .contains(&"command".to_string())
        );
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_connects_to_configured_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut config = SwitchboardConfig::default();
        config.servers.insert(
            "local".to_string(),
            ServerConfig {
                port,
                nickname: "sb".to_string(),
                ..ServerConfig::new("127.0.0.1")
            },
        );
        let controller = Controller::new(config);
        let token = controller.shutdown_token();
        let stop = controller.shutdown_token();

        let (accepted, _) = tokio::join!(
            async {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0; 64];
                let mut read = 0;
                while !buf[..read].windows(2).any(|w| w == b"\r\n") {
                    read += socket.read(&mut buf[read..]).await.unwrap();
                }
                token.cancel();
                String::from_utf8_lossy(&buf[..read]).into_owned()
            },
            tokio::time::timeout(
                Duration::from_secs(5),
                controller.run_until(async move { stop.cancelled().await }),
            ),
        );

        assert!(accepted.starts_with("NICK sb\r\n"));
    }
}
