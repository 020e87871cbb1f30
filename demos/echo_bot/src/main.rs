//! Echo Bot Example
//!
//! A small demonstration of the Switchboard framework. Two plugins are
//! linked into the binary next to the built-in command plugin:
//!
//! - `log` sees every message first (priority 10) and never stops the chain
//! - `echo` answers private commands relayed by the command plugin
//!
//! ```text
//! /msg sb-echo echo "hello world" again   ->  hello world again
//! /msg sb-echo ping                       ->  pong
//! /msg sb-echo help                       ->  Commands: echo <text>, ping, help
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot -- --config demos/echo_bot/switchboard.toml
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use linkme::distributed_slice;
use serde::Deserialize;
use switchboard::prelude::*;
use switchboard::runtime::ConfigLoader;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Switchboard echo bot")]
struct Args {
    /// Configuration file; searched in the usual places when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Profile selecting `switchboard.{profile}.toml` overlays.
    #[arg(short, long)]
    profile: Option<String>,
}

// ============================================================================
// Log plugin
// ============================================================================

#[distributed_slice(PLUGINS)]
static LOG_PLUGIN: PluginDescriptor = PluginDescriptor {
    name: "log",
    create: |_ctx| Ok(Arc::new(LogPlugin)),
};

/// Logs every message without consuming it.
struct LogPlugin;

impl Handler for LogPlugin {
    fn name(&self) -> &str {
        "log"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn implementations(self: Arc<Self>) -> Vec<Implementation> {
        vec![message::implement(self)]
    }
}

#[async_trait]
impl MessageHandler for LogPlugin {
    async fn on_message(
        &self,
        _client: BoxedClient,
        user: String,
        channel: String,
        message: String,
    ) -> HandlerResult {
        info!("[{}] {}: {}", channel, Hostmask::parse(&user).nick, message);
        Ok(Outcome::Continue)
    }
}

// ============================================================================
// Echo plugin
// ============================================================================

#[distributed_slice(PLUGINS)]
static ECHO_PLUGIN: PluginDescriptor = PluginDescriptor {
    name: "echo",
    create: EchoPlugin::create,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EchoConfig {
    /// Prepended to every echoed reply.
    prefix: String,
}

struct EchoPlugin {
    prefix: String,
}

impl EchoPlugin {
    fn create(ctx: &PluginContext) -> Result<Arc<dyn Handler>, BoxError> {
        let config: EchoConfig = ctx.get_config()?;
        Ok(Arc::new(Self {
            prefix: config.prefix,
        }))
    }
}

impl Handler for EchoPlugin {
    fn name(&self) -> &str {
        "echo"
    }

    fn implementations(self: Arc<Self>) -> Vec<Implementation> {
        vec![command::implement(self)]
    }
}

#[async_trait]
impl CommandHandler for EchoPlugin {
    async fn on_command(
        &self,
        client: BoxedClient,
        user: String,
        command: String,
        args: Vec<String>,
    ) -> HandlerResult {
        let reply = match command.as_str() {
            "echo" => format!("{}{}", self.prefix, args.join(" ")),
            "ping" => "pong".to_string(),
            "help" => "Commands: echo <text>, ping, help".to_string(),
            _ => return Ok(Outcome::Continue),
        };

        client.msg(Hostmask::parse(&user).nick, &reply).await?;
        Ok(Outcome::Stop)
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(profile) = &args.profile {
        loader = loader.profile(profile);
    }
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let config = loader.load()?;

    logging::init_from_config(&config.logging);

    Controller::new(config).run().await?;

    Ok(())
}
