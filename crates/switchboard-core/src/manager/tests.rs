use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::*;
use crate::args::EventArgs;
use crate::capability::{EVENT_HANDLER, EventSignature};
use crate::error::EmitError;
use crate::event_args;
use crate::handler::{Handler, HandlerResult};
use crate::outcome::Outcome;

static ALPHA: CapabilityDescriptor = CapabilityDescriptor::extending(
    "alpha",
    &[EventSignature::new("on_event", &["first", "second", "third"], 1)],
    &EVENT_HANDLER,
);

static BETA: CapabilityDescriptor = CapabilityDescriptor::extending(
    "beta",
    &[
        EventSignature::new("on_event", &["first"], 1),
        EventSignature::new("on_other", &[], 0),
    ],
    &EVENT_HANDLER,
);

static ALPHA_IMPOSTOR: CapabilityDescriptor = CapabilityDescriptor::extending(
    "alpha",
    &[EventSignature::new("on_event", &["first", "second", "third"], 1)],
    &EVENT_HANDLER,
);

static ALPHA_PLUS: CapabilityDescriptor = CapabilityDescriptor::extending(
    "alpha_plus",
    &[EventSignature::new("on_extra", &["first"], 1)],
    &ALPHA,
);

static INERT: CapabilityDescriptor =
    CapabilityDescriptor::new("inert", &[EventSignature::new("on_event", &[], 0)]);

type Log = Arc<Mutex<Vec<String>>>;

/// Test handler recording every invocation into a shared log.
struct Recorder {
    name: &'static str,
    priority: i32,
    capabilities: Vec<&'static CapabilityDescriptor>,
    result: fn() -> HandlerResult,
    log: Log,
}

impl Recorder {
    fn new(name: &'static str, priority: i32, log: &Log) -> Self {
        Self {
            name,
            priority,
            capabilities: vec![&ALPHA],
            result: || Ok(Outcome::Continue),
            log: Arc::clone(log),
        }
    }

    fn on(mut self, capabilities: Vec<&'static CapabilityDescriptor>) -> Self {
        self.capabilities = capabilities;
        self
    }

    fn returning(mut self, result: fn() -> HandlerResult) -> Self {
        self.result = result;
        self
    }
}

impl Handler for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn implementations(self: Arc<Self>) -> Vec<Implementation> {
        self.capabilities
            .iter()
            .map(|&capability| {
                let mut implementation = Implementation::new(capability);
                for event in capability.all_events() {
                    let this = Arc::clone(&self);
                    let label = format!("{}:{}.{}", self.name, capability.name(), event.name());
                    implementation = implementation.on(
                        event.name(),
                        event.required_count(),
                        event.max_count(),
                        move |args: EventArgs| {
                            let this = Arc::clone(&this);
                            let label = format!("{label}/{}", args.len());
                            async move {
                                this.log.lock().push(label);
                                (this.result)()
                            }
                        },
                    );
                }
                implementation
            })
            .collect()
    }
}

/// Handler that claims a capability but leaves out one of its events.
struct Broken {
    log: Log,
}

impl Handler for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn implementations(self: Arc<Self>) -> Vec<Implementation> {
        let log = Arc::clone(&self.log);
        let alpha = Implementation::new(&ALPHA).on("on_event", 1, 3, move |_args| {
            let log = Arc::clone(&log);
            async move {
                log.lock().push("broken:alpha".to_string());
                Ok(Outcome::Continue)
            }
        });
        // `on_other` is missing.
        let beta = Implementation::new(&BETA).on("on_event", 1, 1, |_args| async {
            Ok(Outcome::Continue)
        });
        vec![alpha, beta]
    }
}

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

#[tokio::test]
async fn test_priority_order_with_stable_ties() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(Recorder::new("c", 30, &log)));
    events.register(Arc::new(Recorder::new("a", 10, &log)));
    events.register(Arc::new(Recorder::new("b1", 20, &log)));
    events.register(Arc::new(Recorder::new("b2", 20, &log)));
    events.register(Arc::new(Recorder::new("z", -5, &log)));

    let outcome = events.emit("alpha.on_event", event_args![1_u8]).await.unwrap();

    assert!(outcome.is_continue());
    assert_eq!(
        entries(&log),
        vec![
            "z:alpha.on_event/1",
            "a:alpha.on_event/1",
            "b1:alpha.on_event/1",
            "b2:alpha.on_event/1",
            "c:alpha.on_event/1",
        ]
    );
    assert_eq!(events.handler_names(), vec!["z", "a", "b1", "b2", "c"]);
}

#[tokio::test]
async fn test_stop_short_circuits_chain() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(Recorder::new("first", 1, &log)));
    events.register(Arc::new(
        Recorder::new("stopper", 2, &log).returning(|| Ok(Outcome::Stop)),
    ));
    events.register(Arc::new(Recorder::new("never", 3, &log)));

    let outcome = events.emit("alpha.on_event", event_args![1_u8]).await.unwrap();

    assert!(outcome.is_stop());
    assert_eq!(
        entries(&log),
        vec!["first:alpha.on_event/1", "stopper:alpha.on_event/1"]
    );
}

#[tokio::test]
async fn test_arity_enforcement() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(Recorder::new("only", 0, &log)));

    let too_few = events.emit("alpha.on_event", EventArgs::new()).await;
    assert!(matches!(
        too_few,
        Err(EmitError::TooFewArguments {
            required: 1,
            provided: 0,
            ..
        })
    ));

    let too_many = events
        .emit("alpha.on_event", event_args![1_u8, 2_u8, 3_u8, 4_u8])
        .await;
    assert!(matches!(
        too_many,
        Err(EmitError::TooManyArguments {
            max: 3,
            provided: 4,
            ..
        })
    ));
    assert!(entries(&log).is_empty());

    events.emit("alpha.on_event", event_args![1_u8]).await.unwrap();
    events.emit("alpha.on_event", event_args![1_u8, 2_u8]).await.unwrap();
    events
        .emit("alpha.on_event", event_args![1_u8, 2_u8, 3_u8])
        .await
        .unwrap();
    assert_eq!(
        entries(&log),
        vec![
            "only:alpha.on_event/1",
            "only:alpha.on_event/2",
            "only:alpha.on_event/3",
        ]
    );
}

#[tokio::test]
async fn test_capability_isolation() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(Recorder::new("alpha_only", 0, &log)));
    events.register(Arc::new(Recorder::new("beta_only", 0, &log).on(vec![&BETA])));
    events.register(Arc::new(
        Recorder::new("both", 5, &log).on(vec![&ALPHA, &BETA]),
    ));

    events.emit("beta.on_event", event_args![1_u8]).await.unwrap();
    events.emit("beta.on_other", EventArgs::new()).await.unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "beta_only:beta.on_event/1",
            "both:beta.on_event/1",
            "beta_only:beta.on_other/0",
            "both:beta.on_other/0",
        ]
    );
}

#[tokio::test]
async fn test_derived_capability_serves_base_events() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(Recorder::new("base", 0, &log)));
    events.register(Arc::new(
        Recorder::new("derived", 5, &log).on(vec![&ALPHA_PLUS]),
    ));
    events.register(Arc::new(Recorder::new("other", 10, &log).on(vec![&BETA])));

    events.emit("alpha.on_event", event_args![1_u8]).await.unwrap();
    events.emit("alpha_plus.on_extra", event_args![2_u8]).await.unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "base:alpha.on_event/1",
            "derived:alpha_plus.on_event/1",
            "derived:alpha_plus.on_extra/1",
        ]
    );
}

#[tokio::test]
async fn test_broken_handler_is_excluded_everywhere() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(Broken {
        log: Arc::clone(&log),
    }));

    assert_eq!(events.handler_count(), 0);

    // Capabilities are still discovered even though the handler was dropped.
    assert!(events.capability("alpha").is_some());
    assert!(events.capability("beta").is_some());

    events.emit("alpha.on_event", event_args![1_u8]).await.unwrap();
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_unknown_capability_is_noop() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(Recorder::new("only", 0, &log)));

    let outcome = events
        .emit("nosuchcapability.on_event", event_args![1_u8])
        .await
        .unwrap();

    assert!(outcome.is_continue());
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_unknown_event_and_malformed_name() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(Recorder::new("only", 0, &log)));

    assert!(matches!(
        events.emit("alpha.on_missing", event_args![1_u8]).await,
        Err(EmitError::UnknownEvent { .. })
    ));
    assert!(matches!(
        events.emit("alpha", event_args![1_u8]).await,
        Err(EmitError::MalformedName(_))
    ));
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_non_event_capability_is_ignored() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(
        Recorder::new("mixed", 0, &log).on(vec![&INERT, &ALPHA]),
    ));
    assert_eq!(events.handler_count(), 1);
    assert!(events.capability("inert").is_none());

    let outcome = events.emit("inert.on_event", EventArgs::new()).await.unwrap();
    assert!(outcome.is_continue());
    assert!(entries(&log).is_empty());

    events.emit("alpha.on_event", event_args![1_u8]).await.unwrap();
    assert_eq!(entries(&log), vec!["mixed:alpha.on_event/1"]);
}

/// Claims `INERT` without implementing its event.
struct Incomplete;

impl Handler for Incomplete {
    fn name(&self) -> &str {
        "incomplete"
    }

    fn implementations(self: Arc<Self>) -> Vec<Implementation> {
        vec![Implementation::new(&INERT)]
    }
}

#[tokio::test]
async fn test_non_event_capability_is_not_verified() {
    let events = EventManager::new();
    events.register(Arc::new(Incomplete));
    assert_eq!(events.handler_names(), vec!["incomplete"]);
}

#[tokio::test]
async fn test_duplicate_capability_name_keeps_first() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(Recorder::new("genuine", 0, &log)));
    events.register(Arc::new(
        Recorder::new("impostor", 0, &log).on(vec![&ALPHA_IMPOSTOR]),
    ));

    // Both handlers verify and are registered.
    assert_eq!(events.handler_count(), 2);
    assert!(events.capability("alpha").unwrap().is(&ALPHA));

    // Only the handler bound to the authoritative descriptor participates.
    events.emit("alpha.on_event", event_args![1_u8]).await.unwrap();
    assert_eq!(entries(&log), vec!["genuine:alpha.on_event/1"]);
}

#[tokio::test]
async fn test_outcome_is_last_participant_result() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(
        Recorder::new("early", 1, &log).returning(|| Ok(Outcome::value("early"))),
    ));
    events.register(Arc::new(
        Recorder::new("late", 2, &log).returning(|| Ok(Outcome::value("late"))),
    ));
    events.register(Arc::new(Recorder::new("other", 3, &log).on(vec![&BETA])));

    let outcome = events.emit("alpha.on_event", event_args![1_u8]).await.unwrap();
    assert_eq!(outcome.downcast_ref::<&str>(), Some(&"late"));
}

#[tokio::test]
async fn test_handler_error_does_not_abort_chain() {
    let log = new_log();
    let events = EventManager::new();
    events.register(Arc::new(
        Recorder::new("failing", 1, &log).returning(|| Err("boom".into())),
    ));
    events.register(Arc::new(Recorder::new("after", 2, &log)));

    let outcome = events.emit("alpha.on_event", event_args![1_u8]).await.unwrap();

    assert!(outcome.is_continue());
    assert_eq!(
        entries(&log),
        vec!["failing:alpha.on_event/1", "after:alpha.on_event/1"]
    );
}

/// Handler that re-emits a derived event through the same manager.
struct Relay {
    events: Weak<EventManager>,
}

impl Handler for Relay {
    fn name(&self) -> &str {
        "relay"
    }

    fn implementations(self: Arc<Self>) -> Vec<Implementation> {
        vec![Implementation::new(&BETA)
            .on("on_event", 1, 1, move |args: EventArgs| {
                let events = self.events.clone();
                async move {
                    let events = events.upgrade().ok_or("manager dropped")?;
                    let value = *args.get::<u8>(0)?;
                    Ok(events.emit("alpha.on_event", event_args![value]).await?)
                }
            })
            .on("on_other", 0, 0, |_args| async { Ok(Outcome::Continue) })]
    }
}

#[tokio::test]
async fn test_nested_emission_forwards_inner_outcome() {
    let log = new_log();
    let events = Arc::new(EventManager::new());
    events.register(Arc::new(Relay {
        events: Arc::downgrade(&events),
    }));
    events.register(Arc::new(
        Recorder::new("inner", 0, &log).returning(|| Ok(Outcome::Stop)),
    ));
    events.register(Arc::new(Recorder::new("outer_tail", 50, &log).on(vec![&BETA])));

    let outcome = events.emit("beta.on_event", event_args![7_u8]).await.unwrap();

    assert!(outcome.is_stop());
    assert_eq!(entries(&log), vec!["inner:alpha.on_event/1"]);
}
