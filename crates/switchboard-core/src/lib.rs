//! # Switchboard Core
//!
//! The event dispatch engine of the Switchboard bot framework.
//!
//! Incoming protocol events are routed, in a deterministic order, to an
//! open-ended set of independently developed handlers, any of which may
//! short-circuit further processing.
//!
//! ## Building Blocks
//!
//! - **Capabilities**: named groups of event signatures ([`CapabilityDescriptor`],
//!   [`EventSignature`])
//! - **Handlers**: pluggable units implementing capabilities ([`Handler`],
//!   [`Implementation`], [`EventMethod`])
//! - **Dispatch**: the registry and priority-ordered, short-circuiting
//!   emission engine ([`EventManager`])
//! - **Results**: [`Outcome`] with its `Stop` variant
//! - **Connections**: the [`Client`] handle handlers reply through
//!
//! ## Dispatch Flow
//!
//! ```text
//!                      emit("message.on_message", args)
//! ┌───────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ Transport │────▶│ EventManager │────▶│ priority 10      │
//! └───────────┘     │              │────▶│ priority 100     │──┐ emit("command.on_command")
//!                   │              │──╳  │ priority 200     │  │ (stopped)
//!                   └──────────────┘     └──────────────────┘  │
//!                          ▲                                   │
//!                          └───────────────────────────────────┘
//! ```

pub mod args;
pub mod capability;
pub mod client;
pub mod error;
pub mod handler;
pub mod manager;
pub mod outcome;

pub use args::{EventArg, EventArgs};
pub use capability::{CapabilityDescriptor, EVENT_HANDLER, EventSignature};
pub use client::{BoxedClient, Client, Hostmask};
pub use error::{ArgumentError, BoxError, ClientError, ClientResult, EmitError, VerifyError};
pub use handler::{
    BoxFuture, BoxedHandler, DEFAULT_PRIORITY, EventFn, EventMethod, Handler, HandlerResult,
    Implementation,
};
pub use manager::EventManager;
pub use outcome::Outcome;

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        BoxedClient, CapabilityDescriptor, Client, EVENT_HANDLER, EventArgs, EventManager,
        EventSignature, Handler, HandlerResult, Implementation, Outcome, event_args,
    };
}
