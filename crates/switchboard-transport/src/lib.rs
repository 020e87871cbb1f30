//! # Switchboard Transport
//!
//! Chat protocol connections feeding the event manager. Currently IRC over
//! plain TCP.

pub mod config;
pub mod error;
pub mod irc;

pub use config::{DEFAULT_PORT, RetryConfig, ServerConfig};
pub use error::{TransportError, TransportResult};
pub use irc::{IrcConnection, Line, LineCodec, run_server};
