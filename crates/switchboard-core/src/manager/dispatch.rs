use std::sync::Arc;

use tracing::{Instrument, debug, debug_span, error, warn};

use super::{EventManager, HandlerEntry};
use crate::args::EventArgs;
use crate::capability::CapabilityDescriptor;
use crate::error::EmitError;
use crate::outcome::Outcome;

impl EventManager {
    /// Emits `<capability>.<event>` with positional `args`.
    ///
    /// Handlers implementing the capability run one at a time in priority
    /// order, each awaited before the next starts. A handler returning
    /// [`Outcome::Stop`] ends the chain and the emission yields `Stop`;
    /// otherwise the last participating handler's outcome is returned
    /// ([`Outcome::Continue`] when nobody participated).
    ///
    /// An unknown capability is a silent no-op. Arity violations drop the
    /// emission before any handler runs.
    pub async fn emit(&self, event: &str, args: EventArgs) -> Result<Outcome, EmitError> {
        let span = debug_span!("emit", event = %event, args = args.len());
        self.emit_inner(event, args).instrument(span).await
    }

    async fn emit_inner(&self, qualified: &str, args: EventArgs) -> Result<Outcome, EmitError> {
        let Some((capability_name, event_name)) = qualified.split_once('.') else {
            error!(event = qualified, "Emitted event name is malformed");
            return Err(EmitError::MalformedName(qualified.to_string()));
        };

        let (capability, handlers) = {
            let registry = self.registry.read();
            let Some(capability) = registry.capabilities.get(capability_name).copied() else {
                return Ok(Outcome::Continue);
            };
            (capability, registry.handlers.clone())
        };

        let Some(event) = capability.event(event_name) else {
            error!(
                capability = capability_name,
                event = event_name,
                "Emitted event is not declared by its capability"
            );
            return Err(EmitError::UnknownEvent {
                capability: capability_name.to_string(),
                event: event_name.to_string(),
            });
        };

        if !capability.is_event_handler() {
            warn!(
                event = qualified,
                capability = capability_name,
                "Emitted event's capability is not an event handler capability"
            );
            return Err(EmitError::NotEventCapability(capability_name.to_string()));
        }

        if args.len() < event.required_count() {
            warn!(
                event = qualified,
                required = event.required_count(),
                provided = args.len(),
                "Emitted event's declaration requires more arguments"
            );
            return Err(EmitError::TooFewArguments {
                event: qualified.to_string(),
                required: event.required_count(),
                provided: args.len(),
            });
        }

        if args.len() > event.max_count() {
            warn!(
                event = qualified,
                max = event.max_count(),
                provided = args.len(),
                "Emitted event's declaration accepts fewer arguments"
            );
            return Err(EmitError::TooManyArguments {
                event: qualified.to_string(),
                max: event.max_count(),
                provided: args.len(),
            });
        }

        Ok(run_chain(capability, event.name(), &handlers, args).await)
    }
}

/// Invokes every participating handler in order until one returns `Stop`.
async fn run_chain(
    capability: &'static CapabilityDescriptor,
    event: &'static str,
    handlers: &[Arc<HandlerEntry>],
    args: EventArgs,
) -> Outcome {
    let mut outcome = Outcome::Continue;

    for entry in handlers {
        let Some(method) = entry
            .adapt(capability)
            .and_then(|implementation| implementation.get(event))
        else {
            continue;
        };

        match method.invoke(args.clone()).await {
            Ok(Outcome::Stop) => {
                debug!(
                    handler = %entry.name,
                    capability = capability.name(),
                    event,
                    "Handler stopped the chain"
                );
                return Outcome::Stop;
            }
            Ok(result) => outcome = result,
            Err(e) => {
                error!(
                    handler = %entry.name,
                    capability = capability.name(),
                    event,
                    error = %e,
                    "Handler returned an error"
                );
                outcome = Outcome::Continue;
            }
        }
    }

    outcome
}
