//! Command dispatch.
//!
//! Private messages sent to the bot are lexed with [`shell_split`] and
//! re-emitted as `command.on_command(client, user, command, args)` by the
//! [`CommandPlugin`]. Implement [`CommandHandler`] to react to them.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Echo;
//!
//! #[async_trait]
//! impl CommandHandler for Echo {
//!     async fn on_command(
//!         &self,
//!         client: BoxedClient,
//!         user: String,
//!         command: String,
//!         args: Vec<String>,
//!     ) -> HandlerResult {
//!         if command != "echo" {
//!             return Ok(Outcome::Continue);
//!         }
//!         let nick = Hostmask::parse(&user).nick;
//!         client.msg(nick, &args.join(" ")).await?;
//!         Ok(Outcome::Stop)
//!     }
//! }
//! ```

mod plugin;
mod split;

use std::sync::Arc;

use async_trait::async_trait;
use switchboard_core::{
    BoxedClient, CapabilityDescriptor, EVENT_HANDLER, EventArgs, EventSignature, HandlerResult,
    Implementation,
};

pub use plugin::{COMMAND_PRIORITY, CommandPlugin, CommandPluginConfig};
pub use split::{SplitError, shell_split};

/// Qualified name of the command event.
pub const ON_COMMAND: &str = "command.on_command";

/// Descriptor of the `command` capability.
pub static COMMAND: CapabilityDescriptor = CapabilityDescriptor::extending(
    "command",
    &[EventSignature::new(
        "on_command",
        &["client", "user", "command", "args"],
        4,
    )],
    &EVENT_HANDLER,
);

/// Typed view of the `command` capability.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    /// Handles one command. `command` is the first word of the private
    /// message and `args` the remaining words.
    async fn on_command(
        &self,
        client: BoxedClient,
        user: String,
        command: String,
        args: Vec<String>,
    ) -> HandlerResult;
}

/// Builds the `command` [`Implementation`] for a typed handler.
pub fn implement<H: CommandHandler>(handler: Arc<H>) -> Implementation {
    Implementation::new(&COMMAND).on("on_command", 4, 4, move |args: EventArgs| {
        let handler = Arc::clone(&handler);
        async move {
            let client = args.get::<BoxedClient>(0)?.clone();
            let user = args.get::<String>(1)?.clone();
            let command = args.get::<String>(2)?.clone();
            let rest = args.get::<Vec<String>>(3)?.clone();
            handler.on_command(client, user, command, rest).await
        }
    })
}
