//! Handler and emission results.

use std::any::Any;

use crate::args::EventArg;

/// Result of one handler invocation, and of a whole emission.
///
/// Only [`Outcome::Stop`] has meaning to the dispatch engine: it halts the
/// remaining handler chain. Ordinary values are passed through unaggregated.
#[derive(Clone, Debug, Default)]
pub enum Outcome {
    /// Let lower-priority handlers run.
    #[default]
    Continue,
    /// Halt the handler chain for this emission.
    Stop,
    /// An ordinary payload.
    Value(EventArg),
}

impl Outcome {
    /// Wraps an ordinary payload.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(EventArg::new(value))
    }

    /// Returns `true` for [`Outcome::Stop`].
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }

    /// Returns `true` for [`Outcome::Continue`].
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Returns the payload as a `T`, if this is a [`Outcome::Value`] holding one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Value(arg) => arg.downcast_ref::<T>(),
            _ => None,
        }
    }
}
