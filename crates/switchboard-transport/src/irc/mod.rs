//! IRC client transport.
//!
//! [`run_server`] owns one configured server for the lifetime of the
//! process: it connects, drives a [`run_session`] over the TCP stream and
//! reconnects with exponential backoff until shut down.

mod codec;
mod connection;
mod line;
mod session;

use std::sync::Arc;

use switchboard_core::EventManager;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use codec::{DEFAULT_MAX_LINE_LENGTH, LineCodec};
pub use connection::IrcConnection;
pub use line::Line;
pub use session::{SessionEnd, run_session};

use crate::config::{RetryConfig, ServerConfig};
use crate::error::{TransportError, TransportResult};

/// Opens a TCP connection to the configured server.
pub async fn connect(config: &ServerConfig) -> TransportResult<TcpStream> {
    TcpStream::connect((config.hostname.as_str(), config.port))
        .await
        .map_err(|source| TransportError::ConnectionFailed {
            address: config.address(),
            source,
        })
}

/// Keeps one server connected until `shutdown` fires or retries run out.
pub async fn run_server(
    name: String,
    config: ServerConfig,
    retry: RetryConfig,
    events: Arc<EventManager>,
    shutdown: CancellationToken,
) {
    let mut failures = 0u32;
    let mut delay = retry.initial_delay;

    loop {
        info!(server = %name, address = %config.address(), "Connecting to IRC server");

        let attempt = tokio::select! {
            _ = shutdown.cancelled() => break,
            attempt = connect(&config) => attempt,
        };

        match attempt {
            Ok(stream) => {
                info!(server = %name, "Connected");
                failures = 0;
                delay = retry.initial_delay;

                match run_session(&name, stream, &config, &events, &shutdown).await {
                    Ok(SessionEnd::Shutdown) => break,
                    Ok(SessionEnd::Disconnected) => {}
                    Err(e) => warn!(server = %name, error = %e, "Session failed"),
                }
            }
            Err(e) => {
                warn!(server = %name, error = %e, "Connection failed");
                failures += 1;
            }
        }

        if let Some(max) = retry.max_retries {
            if failures > max {
                error!(server = %name, "Max retries reached, giving up");
                break;
            }
        }

        warn!(server = %name, delay = ?delay, "Reconnecting...");
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        delay = retry.next_delay(delay);
    }

    info!(server = %name, "Server connection stopped");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ServerConfig {
            port,
            ..ServerConfig::new("127.0.0.1")
        };
        let retry = RetryConfig {
            max_retries: Some(1),
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            multiplier: 2.0,
        };

        tokio::time::timeout(
            Duration::from_secs(5),
            run_server(
                "local".to_string(),
                config,
                retry,
                Arc::new(EventManager::new()),
                CancellationToken::new(),
            ),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = ServerConfig {
            port,
            ..ServerConfig::new("127.0.0.1")
        };
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(run_server(
            "local".to_string(),
            config,
            RetryConfig::default(),
            Arc::new(EventManager::new()),
            shutdown.clone(),
        ));

        let (_socket, _) = listener.accept().await.unwrap();
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
