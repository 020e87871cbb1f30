//! Handler registry and event dispatch.
//!
//! [`EventManager`] is the single owner of:
//!
//! - the capability-name → [`CapabilityDescriptor`] map, populated lazily the
//!   first time a handler claiming a capability is registered;
//! - the handler list, kept stably ordered by ascending priority.
//!
//! One manager is created at startup and shared as `Arc<EventManager>` with
//! every component that registers or emits. Registration is expected to
//! finish before emissions begin; the state lock is never held across an
//! `.await`, so handlers may emit recursively.
//!
//! # Example
//!
//! ```rust,ignore
//! let events = Arc::new(EventManager::new());
//! events.register(Arc::new(CommandPlugin::new(Arc::downgrade(&events))));
//!
//! let outcome = events
//!     .emit("message.on_message", event_args![client, user, channel, text])
//!     .await?;
//! ```

mod dispatch;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::capability::CapabilityDescriptor;
use crate::handler::{BoxedHandler, Implementation};

// =============================================================================
// HandlerEntry (internal)
// =============================================================================

/// A verified handler together with its per-capability implementations.
struct HandlerEntry {
    name: String,
    priority: i32,
    implementations: Vec<Implementation>,
    /// Keeps the handler alive for as long as it is registered.
    _handler: BoxedHandler,
}

impl HandlerEntry {
    /// Adapts the handler to `capability`, or `None` if it does not
    /// implement it. An implementation of a derived capability also serves
    /// its bases, since it carries every inherited event.
    fn adapt(&self, capability: &CapabilityDescriptor) -> Option<&Implementation> {
        self.implementations
            .iter()
            .find(|implementation| implementation.capability().is(capability))
            .or_else(|| {
                self.implementations
                    .iter()
                    .find(|implementation| implementation.capability().extends(capability))
            })
    }
}

#[derive(Default)]
struct Registry {
    capabilities: HashMap<&'static str, &'static CapabilityDescriptor>,
    handlers: Vec<Arc<HandlerEntry>>,
}

// =============================================================================
// EventManager
// =============================================================================

/// Registry of handlers and capabilities, and the dispatch engine over them.
#[derive(Default)]
pub struct EventManager {
    registry: RwLock<Registry>,
}

impl EventManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler.
    ///
    /// For every event capability the handler claims, the capability is
    /// recorded (first-seen descriptor wins on a name clash) and the
    /// implementation is verified. If any implementation fails verification
    /// the handler is not registered at all, for any capability.
    /// Implementations of capabilities not extending
    /// [`EVENT_HANDLER`](crate::EVENT_HANDLER) are ignored.
    pub fn register(&self, handler: BoxedHandler) {
        let name = handler.name().to_string();
        let priority = handler.priority();
        let mut implementations = Arc::clone(&handler).implementations();
        implementations.retain(|implementation| {
            let keep = implementation.capability().is_event_handler();
            if !keep {
                debug!(
                    handler = %name,
                    capability = implementation.capability().name(),
                    "Ignoring non-event capability"
                );
            }
            keep
        });

        let mut registry = self.registry.write();

        for implementation in &implementations {
            let capability = implementation.capability();
            match registry.capabilities.get(capability.name()) {
                Some(known) if !known.is(capability) => {
                    warn!(
                        capability = capability.name(),
                        handler = %name,
                        "Duplicate capability name, keeping the first descriptor"
                    );
                }
                Some(_) => {}
                None => {
                    debug!(capability = capability.name(), "Capability discovered");
                    registry
                        .capabilities
                        .insert(capability.name(), capability);
                }
            }

            if let Err(e) = implementation.verify() {
                error!(
                    handler = %name,
                    capability = capability.name(),
                    error = %e,
                    "Event handler is broken, skipping registration"
                );
                return;
            }
        }

        let position = registry
            .handlers
            .partition_point(|entry| entry.priority <= priority);
        registry.handlers.insert(
            position,
            Arc::new(HandlerEntry {
                name: name.clone(),
                priority,
                implementations,
                _handler: handler,
            }),
        );

        info!(handler = %name, priority, "Loaded event handler");
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.registry.read().handlers.len()
    }

    /// Returns registered handler names in dispatch order.
    pub fn handler_names(&self) -> Vec<String> {
        self.registry
            .read()
            .handlers
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Returns the authoritative descriptor registered under `name`.
    pub fn capability(&self, name: &str) -> Option<&'static CapabilityDescriptor> {
        self.registry.read().capabilities.get(name).copied()
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("EventManager")
            .field("capabilities", &registry.capabilities.len())
            .field("handler_count", &registry.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
