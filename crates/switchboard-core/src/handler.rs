//! Handler trait and capability implementations.
//!
//! A [`Handler`] is one pluggable unit of behaviour. It claims capabilities by
//! returning one [`Implementation`] per capability; each implementation maps
//! the capability's event names to [`EventMethod`]s.
//!
//! Typed capability traits (see the framework crate) generate conforming
//! implementations. Hand-built implementations are checked at registration
//! time by [`Implementation::verify`].
//!
//! ```rust,ignore
//! struct Logger;
//!
//! impl Handler for Logger {
//!     fn name(&self) -> &str {
//!         "logger"
//!     }
//!
//!     fn implementations(self: Arc<Self>) -> Vec<Implementation> {
//!         vec![Implementation::new(&MESSAGE).on("on_message", 4, 4, |args| async move {
//!             info!(user = %args.get::<String>(1)?, "message received");
//!             Ok(Outcome::Continue)
//!         })]
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub use futures::future::BoxFuture;
use futures::FutureExt;

use crate::args::EventArgs;
use crate::capability::CapabilityDescriptor;
use crate::error::{BoxError, VerifyError};
use crate::outcome::Outcome;

/// Result of a single handler invocation.
pub type HandlerResult = Result<Outcome, BoxError>;

/// Type-erased event method.
pub type EventFn = Arc<dyn Fn(EventArgs) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Priority used when a handler does not override [`Handler::priority`].
pub const DEFAULT_PRIORITY: i32 = 0;

// ============================================================================
// Handler
// ============================================================================

/// A pluggable unit of behaviour registered with the
/// [`EventManager`](crate::EventManager).
///
/// Lower priorities run first; equal priorities run in registration order.
pub trait Handler: Send + Sync + 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Dispatch priority.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// The capabilities this handler implements.
    fn implementations(self: Arc<Self>) -> Vec<Implementation>;
}

/// Shared handler trait object.
pub type BoxedHandler = Arc<dyn Handler>;

// ============================================================================
// EventMethod
// ============================================================================

/// One concrete event implementation with its accepted arity.
#[derive(Clone)]
pub struct EventMethod {
    name: &'static str,
    required: usize,
    max: usize,
    call: EventFn,
}

impl EventMethod {
    /// Creates an event method accepting between `required` and `max`
    /// positional arguments.
    pub fn new<F, Fut>(name: &'static str, required: usize, max: usize, f: F) -> Self
    where
        F: Fn(EventArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            name,
            required,
            max,
            call: Arc::new(move |args| f(args).boxed()),
        }
    }

    /// Event name this method implements.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Minimum number of arguments the method needs.
    pub fn required_count(&self) -> usize {
        self.required
    }

    /// Maximum number of arguments the method accepts.
    pub fn max_count(&self) -> usize {
        self.max
    }

    /// Invokes the method.
    pub fn invoke(&self, args: EventArgs) -> BoxFuture<'static, HandlerResult> {
        (self.call)(args)
    }
}

impl fmt::Debug for EventMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMethod")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("max", &self.max)
            .finish()
    }
}

// ============================================================================
// Implementation
// ============================================================================

/// A handler's view restricted to one capability.
#[derive(Clone, Debug)]
pub struct Implementation {
    capability: &'static CapabilityDescriptor,
    methods: HashMap<&'static str, EventMethod>,
}

impl Implementation {
    /// Starts an implementation of `capability` with no methods.
    pub fn new(capability: &'static CapabilityDescriptor) -> Self {
        Self {
            capability,
            methods: HashMap::new(),
        }
    }

    /// Adds an event method (builder pattern).
    pub fn method(mut self, method: EventMethod) -> Self {
        self.methods.insert(method.name, method);
        self
    }

    /// Adds an event method from a closure (builder pattern).
    pub fn on<F, Fut>(self, name: &'static str, required: usize, max: usize, f: F) -> Self
    where
        F: Fn(EventArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.method(EventMethod::new(name, required, max, f))
    }

    /// The implemented capability.
    pub fn capability(&self) -> &'static CapabilityDescriptor {
        self.capability
    }

    /// Looks up the method for `event`.
    pub fn get(&self, event: &str) -> Option<&EventMethod> {
        self.methods.get(event)
    }

    /// Checks that every event the capability declares is implemented with a
    /// compatible arity.
    ///
    /// An implementation is compatible when it requires no more arguments
    /// than the declaration and accepts at least as many as it allows.
    pub fn verify(&self) -> Result<(), VerifyError> {
        let capability = self.capability.name();
        for event in self.capability.all_events() {
            let method = self
                .methods
                .get(event.name())
                .ok_or(VerifyError::MissingEvent {
                    capability,
                    event: event.name(),
                })?;

            if method.required > event.required_count() {
                return Err(VerifyError::RequiresTooMany {
                    capability,
                    event: event.name(),
                    declared: event.required_count(),
                    implemented: method.required,
                });
            }

            if method.max < event.max_count() {
                return Err(VerifyError::AcceptsTooFew {
                    capability,
                    event: event.name(),
                    declared: event.max_count(),
                    implemented: method.max,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{EVENT_HANDLER, EventSignature};

    static PING: CapabilityDescriptor = CapabilityDescriptor::extending(
        "ping",
        &[
            EventSignature::new("on_ping", &["client", "token"], 1),
            EventSignature::new("on_pong", &["client"], 1),
        ],
        &EVENT_HANDLER,
    );

    async fn noop(_args: EventArgs) -> HandlerResult {
        Ok(Outcome::Continue)
    }

    #[test]
    fn test_verify_accepts_exact_and_wider_arity() {
        let exact = Implementation::new(&PING)
            .on("on_ping", 1, 2, noop)
            .on("on_pong", 1, 1, noop);
        assert!(exact.verify().is_ok());

        let wider = Implementation::new(&PING)
            .on("on_ping", 0, 5, noop)
            .on("on_pong", 1, 3, noop);
        assert!(wider.verify().is_ok());
    }

    #[test]
    fn test_verify_reports_missing_event() {
        let implementation = Implementation::new(&PING).on("on_ping", 1, 2, noop);
        assert!(matches!(
            implementation.verify(),
            Err(VerifyError::MissingEvent {
                event: "on_pong",
                ..
            })
        ));
    }

    #[test]
    fn test_verify_reports_incompatible_arity() {
        let strict = Implementation::new(&PING)
            .on("on_ping", 2, 2, noop)
            .on("on_pong", 1, 1, noop);
        assert!(matches!(
            strict.verify(),
            Err(VerifyError::RequiresTooMany { declared: 1, implemented: 2, .. })
        ));

        let narrow = Implementation::new(&PING)
            .on("on_ping", 1, 1, noop)
            .on("on_pong", 1, 1, noop);
        assert!(matches!(
            narrow.verify(),
            Err(VerifyError::AcceptsTooFew { declared: 2, implemented: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_method_invocation() {
        let implementation = Implementation::new(&PING).on("on_pong", 1, 1, |args| async move {
            Ok(Outcome::value(args.len()))
        });
        let method = implementation.get("on_pong").unwrap();
        let outcome = method.invoke(EventArgs::new().with(())).await.unwrap();
        assert_eq!(outcome.downcast_ref::<usize>(), Some(&1));
        assert!(implementation.get("on_ping").is_none());
    }
}
