//! The `message` capability.
//!
//! Emitted by the transport for every chat message received on a
//! connection, both in channels and in private.

use std::sync::Arc;

use async_trait::async_trait;
use switchboard_core::{
    BoxedClient, CapabilityDescriptor, EVENT_HANDLER, EventArgs, EventSignature, HandlerResult,
    Implementation,
};

/// Qualified name of the message event.
pub const ON_MESSAGE: &str = "message.on_message";

/// Descriptor of the `message` capability.
pub static MESSAGE: CapabilityDescriptor = CapabilityDescriptor::extending(
    "message",
    &[EventSignature::new(
        "on_message",
        &["client", "user", "channel", "message"],
        4,
    )],
    &EVENT_HANDLER,
);

/// Typed view of the `message` capability.
///
/// `user` is the raw sender identity (`nick!user@host`); `channel` is the
/// target the message was sent to, which equals the client's nickname for
/// private messages.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn on_message(
        &self,
        client: BoxedClient,
        user: String,
        channel: String,
        message: String,
    ) -> HandlerResult;
}

/// Builds the `message` [`Implementation`] for a typed handler.
pub fn implement<H: MessageHandler>(handler: Arc<H>) -> Implementation {
    Implementation::new(&MESSAGE).on("on_message", 4, 4, move |args: EventArgs| {
        let handler = Arc::clone(&handler);
        async move {
            let client = args.get::<BoxedClient>(0)?.clone();
            let user = args.get::<String>(1)?.clone();
            let channel = args.get::<String>(2)?.clone();
            let message = args.get::<String>(3)?.clone();
            handler.on_message(client, user, channel, message).await
        }
    })
}
