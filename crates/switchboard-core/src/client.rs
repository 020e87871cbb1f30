//! Connection handle passed to handlers.
//!
//! The transport layer implements [`Client`] for each live server
//! connection and passes it as the first argument of message-derived events,
//! so handlers can reply without knowing anything about the wire protocol.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ClientResult;

/// A live connection to one chat server.
#[async_trait]
pub trait Client: Send + Sync {
    /// Name of the configured server this connection belongs to.
    fn server(&self) -> &str;

    /// The nickname currently used on this connection.
    fn nickname(&self) -> String;

    /// Sends a message to a nickname or channel.
    async fn msg(&self, target: &str, text: &str) -> ClientResult<()>;
}

/// Shared connection handle.
pub type BoxedClient = Arc<dyn Client>;

/// A parsed `nick!user@host` sender identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hostmask<'a> {
    /// Nickname.
    pub nick: &'a str,
    /// Username (ident), if present.
    pub user: Option<&'a str>,
    /// Hostname, if present.
    pub host: Option<&'a str>,
}

impl<'a> Hostmask<'a> {
    /// Splits a sender identity. Missing parts are `None`; a bare nickname
    /// is accepted.
    pub fn parse(identity: &'a str) -> Self {
        let (rest, host) = match identity.split_once('@') {
            Some((rest, host)) => (rest, Some(host)),
            None => (identity, None),
        };
        let (nick, user) = match rest.split_once('!') {
            Some((nick, user)) => (nick, Some(user)),
            None => (rest, None),
        };
        Self { nick, user, host }
    }
}

impl fmt::Display for Hostmask<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nick)?;
        if let Some(user) = self.user {
            write!(f, "!{user}")?;
        }
        if let Some(host) = self.host {
            write!(f, "@{host}")?;
        }
        Ok(())
    }
}
