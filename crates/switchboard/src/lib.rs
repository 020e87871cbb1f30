//! # Switchboard
//!
//! A plugin-based IRC bot framework built around a priority-ordered,
//! short-circuiting event dispatcher.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐  message.on_message  ┌──────────────┐     ┌──────────────────────┐
//! │ Transport │─────────────────────▶│ EventManager │────▶│ CommandPlugin (100)  │──┐
//! │   (IRC)   │                      │              │────▶│ user plugins ...     │  │
//! └───────────┘                      └──────────────┘     └──────────────────────┘  │
//!                                           ▲         command.on_command            │
//!                                           └───────────────────────────────────────┘
//! ```
//!
//! - **Controller**: loads configuration and plugins, runs one connection
//!   per configured server
//! - **Transport**: IRC sessions that turn chat lines into events
//! - **Plugins**: handlers discovered at link time through [`PLUGINS`]
//! - **Handlers**: typed traits such as [`CommandHandler`] and
//!   [`MessageHandler`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linkme::distributed_slice;
//! use switchboard::prelude::*;
//!
//! struct Ping;
//!
//! impl Handler for Ping {
//!     fn name(&self) -> &str {
//!         "ping"
//!     }
//!
//!     fn implementations(self: Arc<Self>) -> Vec<Implementation> {
//!         vec![command::implement(self)]
//!     }
//! }
//!
//! #[async_trait]
//! impl CommandHandler for Ping {
//!     async fn on_command(
//!         &self,
//!         client: BoxedClient,
//!         user: String,
//!         command: String,
//!         _args: Vec<String>,
//!     ) -> HandlerResult {
//!         if command != "ping" {
//!             return Ok(Outcome::Continue);
//!         }
//!         client.msg(Hostmask::parse(&user).nick, "pong").await?;
//!         Ok(Outcome::Stop)
//!     }
//! }
//!
//! #[distributed_slice(PLUGINS)]
//! static PING: PluginDescriptor = PluginDescriptor {
//!     name: "ping",
//!     create: |_ctx| Ok(Arc::new(Ping)),
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     logging::init_from_config(&config.logging);
//!     Controller::new(config).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output
//!
//! Crates registering plugins need `linkme` as a direct dependency.

pub use switchboard_core as core;
pub use switchboard_framework as framework;
pub use switchboard_runtime as runtime;
pub use switchboard_transport as transport;

pub use switchboard_core::event_args;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use switchboard::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    pub use async_trait::async_trait;

    // Runtime - main entry point
    pub use switchboard_runtime::{Controller, load_config, load_config_from_file, logging};

    // Plugin system
    pub use switchboard_framework::{PLUGINS, PluginContext, PluginDescriptor};

    // Built-in capabilities
    pub use switchboard_framework::command::{self, CommandHandler};
    pub use switchboard_framework::message::{self, MessageHandler};

    // Dispatch core
    pub use switchboard_core::{
        BoxError, BoxedClient, Client, EventArgs, EventManager, Handler, HandlerResult, Hostmask,
        Implementation, Outcome,
    };
}
