#![forbid(unsafe_code)]

//! Structured logging integration tests.
//!
//! These tests install a capturing `tracing` layer and verify that advisory
//! conditions surface as `WARN` events with their structured fields, and
//! that run decisions are logged at `DEBUG`.
//!
//!   cargo test -p reel-runtime --test tracing_tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reel_core::direction::Direction;
use reel_core::settings::Settings;
use reel_runtime::Reel;

use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured event with its level and fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

/// A tracing Layer that records every event.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Visitor that extracts event fields.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

/// Run `f` with a capturing subscriber installed and return what it logged.
fn with_captured_events<F>(f: F) -> Vec<CapturedEvent>
where
    F: FnOnce(),
{
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    events.lock().unwrap().clone()
}

fn warnings(events: &[CapturedEvent]) -> Vec<&CapturedEvent> {
    events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn invalid_pattern_logs_warning_with_pattern() {
    let events = with_captured_events(|| {
        let mut reel = Reel::new(Settings::new(), 3, 300.0).unwrap();
        reel.mount();
        assert!(reel.go("|9").is_err());
    });
    let warns = warnings(&events);
    assert_eq!(warns.len(), 1, "got {events:?}");
    assert_eq!(warns[0].fields.get("pattern").map(String::as_str), Some("|9"));
    assert!(
        warns[0]
            .fields
            .get("err")
            .is_some_and(|e| e.contains("invalid direction pattern")),
        "got {:?}",
        warns[0]
    );
}

#[test]
fn unmirrorable_pattern_logs_warning() {
    let events = with_captured_events(|| {
        let reel = Reel::new(Settings::new().direction(Direction::Rtl), 3, 300.0).unwrap();
        assert_eq!(reel.resolve("|>"), "|>");
    });
    let warns = warnings(&events);
    assert_eq!(warns.len(), 1, "got {events:?}");
    assert_eq!(warns[0].fields.get("pattern").map(String::as_str), Some("|>"));
}

#[test]
fn rejected_option_logs_warning() {
    let events = with_captured_events(|| {
        let mut reel = Reel::new(Settings::new(), 3, 300.0).unwrap();
        assert!(reel.set_option("direction", "diagonal").is_err());
    });
    let warns = warnings(&events);
    assert_eq!(warns.len(), 1, "got {events:?}");
    assert_eq!(warns[0].fields.get("key").map(String::as_str), Some("direction"));
}

#[test]
fn accepted_run_logs_decision_at_debug() {
    let events = with_captured_events(|| {
        let mut reel = Reel::new(Settings::new(), 3, 300.0).unwrap();
        reel.mount();
        reel.go(">").unwrap();
    });
    assert!(warnings(&events).is_empty());
    let run = events
        .iter()
        .find(|e| e.level == tracing::Level::DEBUG && e.message() == "run")
        .expect("run decision logged");
    assert_eq!(run.fields.get("from").map(String::as_str), Some("0"));
    assert_eq!(run.fields.get("to").map(String::as_str), Some("1"));
}

#[test]
fn quiet_paths_do_not_warn() {
    let events = with_captured_events(|| {
        let mut reel = Reel::new(Settings::new(), 3, 300.0).unwrap();
        reel.mount();
        reel.disable();
        assert_eq!(reel.go(">"), Ok(false));
        reel.destroy();
    });
    assert!(warnings(&events).is_empty(), "got {events:?}");
}
