use async_trait::async_trait;
use parking_lot::RwLock;
use switchboard_core::{Client, ClientError, ClientResult};
use tokio::sync::mpsc;
use tracing::trace;

use super::line::Line;

/// Handle to one live IRC connection.
///
/// Outgoing lines are queued and written by the session's writer task, so
/// sending never blocks the handler chain.
pub struct IrcConnection {
    server: String,
    nickname: RwLock<String>,
    outgoing: mpsc::UnboundedSender<Line>,
}

impl IrcConnection {
    pub fn new(
        server: impl Into<String>,
        nickname: impl Into<String>,
        outgoing: mpsc::UnboundedSender<Line>,
    ) -> Self {
        Self {
            server: server.into(),
            nickname: RwLock::new(nickname.into()),
            outgoing,
        }
    }

    /// Queues a raw line.
    pub fn send(&self, line: Line) -> ClientResult<()> {
        trace!(server = %self.server, line = %line, "Queueing line");
        self.outgoing
            .send(line)
            .map_err(|_| ClientError::Disconnected)
    }

    pub(crate) fn set_nickname(&self, nickname: &str) {
        *self.nickname.write() = nickname.to_string();
    }

    /// Returns `true` if `nick` is the current nickname.
    pub fn is_me(&self, nick: &str) -> bool {
        self.nickname.read().eq_ignore_ascii_case(nick)
    }

    pub fn join(&self, channel: &str) -> ClientResult<()> {
        validate_target(channel)?;
        self.send(Line::new("JOIN", [channel]))
    }
}

fn validate_target(target: &str) -> ClientResult<()> {
    if target.is_empty() || target.contains([' ', '\r', '\n', '\0']) {
        return Err(ClientError::InvalidMessage(format!(
            "invalid target {target:?}"
        )));
    }
    Ok(())
}

#[async_trait]
impl Client for IrcConnection {
    fn server(&self) -> &str {
        &self.server
    }

    fn nickname(&self) -> String {
        self.nickname.read().clone()
    }

    /// Sends one `PRIVMSG` per non-empty line of `text`. Both CR and LF end
    /// a line; NUL bytes are dropped.
    async fn msg(&self, target: &str, text: &str) -> ClientResult<()> {
        validate_target(target)?;
        let lines = text
            .split(['\r', '\n'])
            .map(|line| line.replace('\0', ""))
            .filter(|line| !line.is_empty());
        for line in lines {
            self.send(Line::new("PRIVMSG", [target, line.as_str()]))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_msg_splits_lines() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = IrcConnection::new("local", "bot", tx);

        connection.msg("alice", "one\n\ntwo").await.unwrap();

        assert_eq!(rx.recv().await.unwrap().to_string(), "PRIVMSG alice one");
        assert_eq!(rx.recv().await.unwrap().to_string(), "PRIVMSG alice two");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_msg_strips_control_characters() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = IrcConnection::new("local", "bot", tx);

        connection.msg("alice", "a\rb\0c\r\n").await.unwrap();

        assert_eq!(rx.recv().await.unwrap().to_string(), "PRIVMSG alice a");
        assert_eq!(rx.recv().await.unwrap().to_string(), "PRIVMSG alice bc");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_msg_rejects_bad_target_and_closed_queue() {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = IrcConnection::new("local", "bot", tx);

        assert!(matches!(
            connection.msg("bad target", "hi").await,
            Err(ClientError::InvalidMessage(_))
        ));

        drop(rx);
        assert!(matches!(
            connection.msg("alice", "hi").await,
            Err(ClientError::Disconnected)
        ));
    }

    #[test]
    fn test_nickname_tracking() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection = IrcConnection::new("local", "bot", tx);
        assert!(connection.is_me("BOT"));
        connection.set_nickname("bot_");
        assert_eq!(connection.nickname(), "bot_");
        assert!(!connection.is_me("bot"));
    }
}
