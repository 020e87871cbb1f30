//! Positional event arguments.
//!
//! Emissions carry their arguments type-erased so that one engine can serve
//! every capability. Typed capability bindings recover the concrete values
//! with [`EventArgs::get`].

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::ArgumentError;

/// A single type-erased, cheaply clonable event argument.
#[derive(Clone)]
pub struct EventArg {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl EventArg {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Returns a reference to the inner value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns `true` if the inner value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Name of the wrapped type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for EventArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventArg").field(&self.type_name).finish()
    }
}

/// Ordered positional arguments of one emission.
#[derive(Clone, Debug, Default)]
pub struct EventArgs(Vec<EventArg>);

impl EventArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an argument.
    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.0.push(EventArg::new(value));
    }

    /// Appends an argument (builder pattern).
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&EventArg> {
        self.0.get(index)
    }

    /// Returns the argument at `index` as a `T`.
    pub fn get<T: Any>(&self, index: usize) -> Result<&T, ArgumentError> {
        let arg = self.0.get(index).ok_or(ArgumentError::Missing { index })?;
        arg.downcast_ref::<T>()
            .ok_or_else(|| ArgumentError::TypeMismatch {
                index,
                expected: type_name::<T>(),
                got: arg.type_name(),
            })
    }

    /// Returns the argument at `index` as a `T`, or `None` when the optional
    /// argument was not supplied.
    pub fn get_optional<T: Any>(&self, index: usize) -> Result<Option<&T>, ArgumentError> {
        if index >= self.0.len() {
            return Ok(None);
        }
        self.get(index).map(Some)
    }

    /// Iterates the arguments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, EventArg> {
        self.0.iter()
    }
}

impl From<Vec<EventArg>> for EventArgs {
    fn from(args: Vec<EventArg>) -> Self {
        Self(args)
    }
}

impl FromIterator<EventArg> for EventArgs {
    fn from_iter<I: IntoIterator<Item = EventArg>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds [`EventArgs`] from a list of values.
///
/// ```rust,ignore
/// let args = event_args![client, user, channel, message];
/// ```
#[macro_export]
macro_rules! event_args {
    () => {
        $crate::EventArgs::new()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::EventArgs::from(::std::vec![$($crate::EventArg::new($arg)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let args = EventArgs::new().with("alice".to_string()).with(42_i64);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get::<String>(0).unwrap(), "alice");
        assert_eq!(*args.get::<i64>(1).unwrap(), 42);
    }

    #[test]
    fn test_type_mismatch_reports_both_types() {
        let args = EventArgs::new().with(7_u8);
        let err = args.get::<String>(0).unwrap_err();
        match err {
            ArgumentError::TypeMismatch {
                index,
                expected,
                got,
            } => {
                assert_eq!(index, 0);
                assert!(expected.contains("String"));
                assert_eq!(got, "u8");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_and_optional() {
        let args = EventArgs::new().with(1_u32);
        assert!(matches!(
            args.get::<u32>(3),
            Err(ArgumentError::Missing { index: 3 })
        ));
        assert_eq!(args.get_optional::<u32>(3).unwrap(), None);
        assert_eq!(args.get_optional::<u32>(0).unwrap(), Some(&1));
    }

    #[test]
    fn test_macro_builds_in_order() {
        let args = crate::event_args!["a".to_string(), vec!["b".to_string()]];
        assert_eq!(args.get::<String>(0).unwrap(), "a");
        assert_eq!(args.get::<Vec<String>>(1).unwrap(), &vec!["b".to_string()]);
        assert!(crate::event_args![].is_empty());
    }
}
