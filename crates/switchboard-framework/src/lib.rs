//! # Switchboard Framework
//!
//! Higher-level building blocks on top of the dispatch core:
//!
//! - The built-in `message` and `command` capabilities with typed handler
//!   traits ([`MessageHandler`], [`CommandHandler`])
//! - The [`CommandPlugin`], which lexes private messages into commands
//! - Link-time plugin discovery through the [`PLUGINS`] slice

pub mod command;
pub mod message;
pub mod plugin;

pub use command::{COMMAND, CommandHandler, CommandPlugin, SplitError, shell_split};
pub use message::{MESSAGE, MessageHandler};
pub use plugin::{PLUGINS, PluginContext, PluginDescriptor};

#[doc(hidden)]
pub use linkme;
