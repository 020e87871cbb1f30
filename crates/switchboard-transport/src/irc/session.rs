use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use switchboard_core::{BoxedClient, Client, EventManager, event_args};
use switchboard_framework::message::ON_MESSAGE;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::codec::LineCodec;
use super::connection::IrcConnection;
use super::line::Line;
use crate::config::ServerConfig;
use crate::error::{TransportError, TransportResult};

const RPL_WELCOME: &str = "001";
const ERR_NICKNAMEINUSE: &str = "433";

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server closed the stream.
    Disconnected,
    /// The shutdown token fired and `QUIT` was sent.
    Shutdown,
}

/// Drives one IRC session over an established stream.
///
/// Registers with the server, keeps the connection alive, and emits
/// `message.on_message` for every `PRIVMSG`. Each emission is awaited
/// before the next line is read.
pub async fn run_session<S>(
    server: &str,
    stream: S,
    config: &ServerConfig,
    events: &Arc<EventManager>,
    shutdown: &CancellationToken,
) -> TransportResult<SessionEnd>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = tokio::io::split(stream);
    let mut lines = FramedRead::new(reader, LineCodec::new());

    let (tx, rx) = mpsc::unbounded_channel();
    let writer_stop = CancellationToken::new();
    let writer_task = tokio::spawn(write_loop(
        FramedWrite::new(writer, LineCodec::new()),
        rx,
        writer_stop.clone(),
    ));

    let connection = Arc::new(IrcConnection::new(server, &config.nickname, tx));
    let result = drive(server, &mut lines, &connection, config, events, shutdown).await;

    writer_stop.cancel();
    match writer_task.await {
        Ok(Err(e)) => warn!(server, error = %e, "Writer stopped with an error"),
        Err(e) => warn!(server, error = %e, "Writer task failed"),
        Ok(Ok(())) => {}
    }

    result
}

async fn drive<R>(
    server: &str,
    lines: &mut FramedRead<R, LineCodec>,
    connection: &Arc<IrcConnection>,
    config: &ServerConfig,
    events: &Arc<EventManager>,
    shutdown: &CancellationToken,
) -> TransportResult<SessionEnd>
where
    R: AsyncRead + Unpin,
{
    let send = |line: Line| {
        if connection.send(line).is_err() {
            warn!(server, "Outgoing queue closed");
        }
    };

    if let Some(password) = &config.password {
        send(Line::new("PASS", [password.as_str()]));
    }
    send(Line::new("NICK", [config.nickname.as_str()]));
    send(Line::new(
        "USER",
        [config.username(), "0", "*", config.realname()],
    ));

    let mut registered = false;

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => {
                info!(server, "Shutting down IRC session");
                send(Line::new("QUIT", ["Shutting down"]));
                return Ok(SessionEnd::Shutdown);
            }
            next = lines.next() => match next {
                Some(line) => line?,
                None => {
                    info!(server, "Server closed the connection");
                    return Ok(SessionEnd::Disconnected);
                }
            },
        };

        trace!(server, line = %line, "Received line");

        match line.command.as_str() {
            "PING" => send(Line::new("PONG", line.params)),
            RPL_WELCOME => {
                registered = true;
                if let Some(nick) = line.param(0) {
                    connection.set_nickname(nick);
                }
                info!(server, nickname = %connection.nickname(), "Registered with server");
                for channel in &config.channels {
                    if let Err(e) = connection.join(channel) {
                        warn!(server, channel = %channel, error = %e, "Cannot join channel");
                    }
                }
            }
            ERR_NICKNAMEINUSE if !registered => {
                let nickname = format!("{}_", connection.nickname());
                debug!(server, nickname = %nickname, "Nickname in use, retrying");
                connection.set_nickname(&nickname);
                send(Line::new("NICK", [nickname]));
            }
            "NICK" => {
                if let (Some(old), Some(new)) = (line.source_nick(), line.param(0)) {
                    if connection.is_me(old) {
                        info!(server, from = %old, to = %new, "Nickname changed");
                        connection.set_nickname(new);
                    }
                }
            }
            "PRIVMSG" => dispatch_message(server, line, connection, events).await,
            "ERROR" => {
                warn!(server, reason = ?line.param(0), "Server reported an error");
            }
            _ => {}
        }
    }
}

async fn dispatch_message(
    server: &str,
    line: Line,
    connection: &Arc<IrcConnection>,
    events: &EventManager,
) {
    let Line {
        prefix,
        mut params,
        ..
    } = line;
    if params.len() < 2 {
        debug!(server, "Ignoring PRIVMSG without text");
        return;
    }
    let message = params.swap_remove(1);
    let channel = params.swap_remove(0);
    let user = prefix.unwrap_or_default();

    let client: BoxedClient = connection.clone();
    // Emission errors are already logged by the manager.
    let _ = events
        .emit(ON_MESSAGE, event_args![client, user, channel, message])
        .await;
}

/// Writes queued lines until stopped. Lines queued before the stop are
/// still written; lines that cannot be encoded are dropped.
async fn write_loop<W>(
    mut sink: FramedWrite<W, LineCodec>,
    mut queue: mpsc::UnboundedReceiver<Line>,
    stop: CancellationToken,
) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            biased;
            line = queue.recv() => match line {
                Some(line) => match sink.send(line).await {
                    Ok(()) => {}
                    Err(TransportError::InvalidLine(line)) => {
                        warn!(line = %line.escape_debug(), "Dropping unencodable line");
                    }
                    Err(e) => return Err(e),
                },
                None => break,
            },
            _ = stop.cancelled() => break,
        }
    }
    sink.close().await
}
