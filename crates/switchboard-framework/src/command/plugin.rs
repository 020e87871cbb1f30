use std::sync::{Arc, Weak};

use async_trait::async_trait;
use linkme::distributed_slice;
use serde::Deserialize;
use switchboard_core::{
    BoxError, BoxedClient, BoxedHandler, EventManager, Handler, HandlerResult, Hostmask,
    Implementation, Outcome, event_args,
};
use tracing::{debug, warn};

use super::{ON_COMMAND, shell_split};
use crate::message::{self, MessageHandler};
use crate::plugin::{PLUGINS, PluginContext, PluginDescriptor};

/// Default dispatch priority of the command plugin.
pub const COMMAND_PRIORITY: i32 = 100;

#[distributed_slice(PLUGINS)]
static COMMAND_PLUGIN: PluginDescriptor = PluginDescriptor {
    name: "command",
    create: CommandPlugin::create,
};

/// Configuration section `[plugins.command]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandPluginConfig {
    pub priority: i32,
}

impl Default for CommandPluginConfig {
    fn default() -> Self {
        Self {
            priority: COMMAND_PRIORITY,
        }
    }
}

/// Turns private messages into `command.on_command` emissions.
pub struct CommandPlugin {
    events: Weak<EventManager>,
    priority: i32,
}

impl CommandPlugin {
    pub fn new(events: Weak<EventManager>) -> Self {
        Self {
            events,
            priority: COMMAND_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn create(ctx: &PluginContext) -> Result<BoxedHandler, BoxError> {
        let config: CommandPluginConfig = ctx.get_config()?;
        Ok(Arc::new(
            Self::new(ctx.events()).with_priority(config.priority),
        ))
    }
}

impl Handler for CommandPlugin {
    fn name(&self) -> &str {
        "command"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn implementations(self: Arc<Self>) -> Vec<Implementation> {
        vec![message::implement(self)]
    }
}

#[async_trait]
impl MessageHandler for CommandPlugin {
    async fn on_message(
        &self,
        client: BoxedClient,
        user: String,
        channel: String,
        message: String,
    ) -> HandlerResult {
        if message.is_empty() || !channel.eq_ignore_ascii_case(&client.nickname()) {
            return Ok(Outcome::Continue);
        }

        let mut words = match shell_split(&message) {
            Ok(words) => words.into_iter(),
            Err(e) => {
                let nick = Hostmask::parse(&user).nick;
                debug!(user = %user, error = %e, "Rejecting malformed command");
                if let Err(send_error) = client.msg(nick, &format!("Invalid syntax: {e}")).await {
                    warn!(user = %user, error = %send_error, "Failed to send syntax error reply");
                }
                return Ok(Outcome::Stop);
            }
        };

        let Some(command) = words.next() else {
            return Ok(Outcome::Continue);
        };
        let args: Vec<String> = words.collect();

        let Some(events) = self.events.upgrade() else {
            warn!(command = %command, "Event manager is gone, dropping command");
            return Ok(Outcome::Continue);
        };

        debug!(user = %user, command = %command, args = args.len(), "Dispatching command");
        Ok(events
            .emit(ON_COMMAND, event_args![client, user, command, args])
            .await?)
    }
}
