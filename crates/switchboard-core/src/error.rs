//! Error types for the Switchboard core.

use thiserror::Error;

/// Boxed error returned by handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised when a typed binding reads its positional arguments.
#[derive(Debug, Clone, Error)]
pub enum ArgumentError {
    /// No argument at this position.
    #[error("missing argument at position {index}")]
    Missing {
        /// Argument position.
        index: usize,
    },

    /// The argument has a different type than the binding expects.
    #[error("argument {index} has type '{got}', expected '{expected}'")]
    TypeMismatch {
        /// Argument position.
        index: usize,
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        got: &'static str,
    },
}

/// A handler does not conform to a capability it claims.
#[derive(Debug, Clone, Error)]
pub enum VerifyError {
    /// An event the capability declares has no implementation.
    #[error("capability '{capability}' declares '{event}', which is not implemented")]
    MissingEvent {
        /// Capability name.
        capability: &'static str,
        /// Event name.
        event: &'static str,
    },

    /// The implementation requires more arguments than the declaration.
    #[error(
        "'{capability}.{event}' implementation requires {implemented} arguments, \
         the declaration only guarantees {declared}"
    )]
    RequiresTooMany {
        /// Capability name.
        capability: &'static str,
        /// Event name.
        event: &'static str,
        /// Required arguments of the declaration.
        declared: usize,
        /// Required arguments of the implementation.
        implemented: usize,
    },

    /// The implementation accepts fewer arguments than the declaration allows.
    #[error(
        "'{capability}.{event}' implementation accepts at most {implemented} arguments, \
         the declaration allows {declared}"
    )]
    AcceptsTooFew {
        /// Capability name.
        capability: &'static str,
        /// Event name.
        event: &'static str,
        /// Maximum arguments of the declaration.
        declared: usize,
        /// Maximum arguments of the implementation.
        implemented: usize,
    },
}

/// Reasons an emission was dropped before reaching any handler.
#[derive(Debug, Clone, Error)]
pub enum EmitError {
    /// The qualified event name has no `<capability>.<event>` separator.
    #[error("malformed event name '{0}', expected '<capability>.<event>'")]
    MalformedName(String),

    /// The capability is known but never declared this event.
    #[error("capability '{capability}' does not declare event '{event}'")]
    UnknownEvent {
        /// Capability name.
        capability: String,
        /// Event name.
        event: String,
    },

    /// The capability does not extend the event-handler marker.
    #[error("capability '{0}' is not an event handler capability")]
    NotEventCapability(String),

    /// Fewer arguments than the event requires.
    #[error("event '{event}' requires at least {required} arguments, only {provided} were provided")]
    TooFewArguments {
        /// Qualified event name.
        event: String,
        /// Minimum argument count.
        required: usize,
        /// Supplied argument count.
        provided: usize,
    },

    /// More arguments than the event accepts.
    #[error("event '{event}' accepts at most {max} arguments, {provided} were provided")]
    TooManyArguments {
        /// Qualified event name.
        event: String,
        /// Maximum argument count.
        max: usize,
        /// Supplied argument count.
        provided: usize,
    },
}

/// Errors surfaced by a connection handle.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The connection is closed.
    #[error("connection is closed")]
    Disconnected,

    /// The message cannot be sent as-is.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Result type for connection handle operations.
pub type ClientResult<T> = Result<T, ClientError>;
