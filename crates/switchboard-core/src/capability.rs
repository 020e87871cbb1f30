//! Capability descriptors and event signatures.
//!
//! A capability is a named group of related events a handler may implement,
//! for example `message` or `command`. Capabilities are declared as `static`
//! items so that every descriptor has a stable address; two descriptors are
//! the *same* capability only when they are the same `static`.
//!
//! ```rust,ignore
//! use switchboard_core::{CapabilityDescriptor, EventSignature};
//!
//! pub static GREETING: CapabilityDescriptor = CapabilityDescriptor::extending(
//!     "greeting",
//!     &[EventSignature::new("on_join", &["client", "user", "channel"], 3)],
//!     &EVENT_HANDLER,
//! );
//! ```

use std::fmt;
use std::ptr;

// ============================================================================
// Event Signature
// ============================================================================

/// Arity contract for one event of a capability.
///
/// `params` lists the positional parameter names; the first `required` of
/// them are mandatory and the rest are optional.
#[derive(Debug, Clone, Copy)]
pub struct EventSignature {
    name: &'static str,
    params: &'static [&'static str],
    required: usize,
}

impl EventSignature {
    /// Declares an event signature.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `static`) if `required`
    /// exceeds the number of declared parameters.
    pub const fn new(name: &'static str, params: &'static [&'static str], required: usize) -> Self {
        assert!(
            required <= params.len(),
            "event signature requires more arguments than it declares"
        );
        Self {
            name,
            params,
            required,
        }
    }

    /// Event name, unique within its capability.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Positional parameter names.
    pub const fn params(&self) -> &'static [&'static str] {
        self.params
    }

    /// Minimum number of positional arguments.
    pub const fn required_count(&self) -> usize {
        self.required
    }

    /// Maximum number of positional arguments (required + optional).
    pub const fn max_count(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for EventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if i >= self.required {
                write!(f, "{param}?")?;
            } else {
                f.write_str(param)?;
            }
        }
        f.write_str(")")
    }
}

// ============================================================================
// Capability Descriptor
// ============================================================================

/// The base marker every event-bearing capability extends.
///
/// Emissions are only dispatched against capabilities that extend this
/// descriptor.
pub static EVENT_HANDLER: CapabilityDescriptor = CapabilityDescriptor::new("event_handler", &[]);

/// Named schema declaring a group of related events.
#[derive(Debug)]
pub struct CapabilityDescriptor {
    name: &'static str,
    events: &'static [EventSignature],
    base: Option<&'static CapabilityDescriptor>,
}

impl CapabilityDescriptor {
    /// Declares a plain capability that does **not** extend [`EVENT_HANDLER`].
    pub const fn new(name: &'static str, events: &'static [EventSignature]) -> Self {
        Self {
            name,
            events,
            base: None,
        }
    }

    /// Declares a capability extending `base`.
    pub const fn extending(
        name: &'static str,
        events: &'static [EventSignature],
        base: &'static CapabilityDescriptor,
    ) -> Self {
        Self {
            name,
            events,
            base: Some(base),
        }
    }

    /// Capability name used in qualified event names.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Events declared directly by this capability.
    pub const fn events(&self) -> &'static [EventSignature] {
        self.events
    }

    /// Capability this one extends, if any.
    pub const fn base(&self) -> Option<&'static CapabilityDescriptor> {
        self.base
    }

    /// Iterates every event this capability declares, including inherited ones.
    pub fn all_events(&self) -> impl Iterator<Item = &'static EventSignature> + '_ {
        self.ancestry().flat_map(|descriptor| descriptor.events.iter())
    }

    /// Looks up an event by name, searching the base chain.
    pub fn event(&self, name: &str) -> Option<&'static EventSignature> {
        self.all_events().find(|event| event.name == name)
    }

    /// Returns `true` if `other` is this descriptor or one of its bases.
    pub fn extends(&self, other: &CapabilityDescriptor) -> bool {
        self.ancestry().any(|descriptor| descriptor.is(other))
    }

    /// Returns `true` if this capability may be emitted against.
    pub fn is_event_handler(&self) -> bool {
        self.extends(&EVENT_HANDLER)
    }

    /// Identity comparison.
    pub fn is(&self, other: &CapabilityDescriptor) -> bool {
        ptr::eq(self, other)
    }

    fn ancestry(&self) -> impl Iterator<Item = &CapabilityDescriptor> {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.base;
            Some(current)
        })
    }
}

impl fmt::Display for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GREETING: CapabilityDescriptor = CapabilityDescriptor::extending(
        "greeting",
        &[
            EventSignature::new("on_join", &["client", "user", "channel"], 3),
            EventSignature::new("on_part", &["client", "user", "channel", "reason"], 3),
        ],
        &EVENT_HANDLER,
    );

    static LOUD_GREETING: CapabilityDescriptor = CapabilityDescriptor::extending(
        "loud_greeting",
        &[EventSignature::new("on_shout", &["client", "text"], 2)],
        &GREETING,
    );

    static PLAIN: CapabilityDescriptor =
        CapabilityDescriptor::new("plain", &[EventSignature::new("poke", &[], 0)]);

    #[test]
    fn test_signature_counts() {
        let part = GREETING.event("on_part").unwrap();
        assert_eq!(part.required_count(), 3);
        assert_eq!(part.max_count(), 4);
        assert_eq!(part.to_string(), "on_part(client, user, channel, reason?)");
    }

    #[test]
    fn test_event_lookup_walks_base_chain() {
        assert!(LOUD_GREETING.event("on_shout").is_some());
        assert!(LOUD_GREETING.event("on_join").is_some());
        assert!(GREETING.event("on_shout").is_none());
        assert_eq!(LOUD_GREETING.all_events().count(), 3);
    }

    #[test]
    fn test_event_handler_marker() {
        assert!(GREETING.is_event_handler());
        assert!(LOUD_GREETING.is_event_handler());
        assert!(LOUD_GREETING.extends(&GREETING));
        assert!(!GREETING.extends(&LOUD_GREETING));
        assert!(!PLAIN.is_event_handler());
    }

    #[test]
    fn test_identity_is_per_static() {
        static OTHER_GREETING: CapabilityDescriptor =
            CapabilityDescriptor::extending("greeting", &[], &EVENT_HANDLER);

        assert!(GREETING.is(&GREETING));
        assert!(!GREETING.is(&OTHER_GREETING));
        assert_eq!(GREETING.name(), OTHER_GREETING.name());
    }

    #[test]
    #[should_panic(expected = "requires more arguments")]
    fn test_signature_rejects_required_over_max() {
        let _ = EventSignature::new("broken", &["a"], 2);
    }
}
