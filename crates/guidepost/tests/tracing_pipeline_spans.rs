#![forbid(unsafe_code)]

//! Tracing output of the show-step pipeline.
//!
//! Verifies:
//! 1. Every pipeline run opens a `tour.show_step` span with `index` and
//!    `generation` fields
//! 2. Generations increase across runs
//! 3. A failing hook logs a WARN on `guidepost.pipeline` naming the hook
//! 4. No ERROR-level logs during normal operation
//! 5. Stale scroll completions are logged as dropped
//!
//! Run:
//!   cargo test -p guidepost --test tracing_pipeline_spans

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use guidepost::runtime::testing::{FakeEnvironment, FakeNode};
use guidepost::{Hook, HookError, NodeRect, Size, Step, Tour, TourConfig, TourOptions, Viewport};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Tracing capture infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

struct SpanCapture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl SpanCapture {
    fn new() -> (Self, CaptureHandle) {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let handle = CaptureHandle {
            spans: spans.clone(),
            events: events.clone(),
        };
        (Self { spans, events }, handle)
    }
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn show_step_spans(&self) -> Vec<CapturedSpan> {
        self.spans()
            .into_iter()
            .filter(|span| span.name == "tour.show_step")
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for SpanCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        for field in attrs.metadata().fields() {
            fields.entry(field.name().to_string()).or_default();
        }
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields,
        });
    }
}

fn with_captured_tracing<F, R>(f: F) -> (R, CaptureHandle)
where
    F: FnOnce() -> R,
{
    let (layer, handle) = SpanCapture::new();
    let subscriber = tracing_subscriber::registry().with(layer);
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, handle)
}

// ============================================================================
// Helpers
// ============================================================================

fn page() -> FakeEnvironment {
    let mut env = FakeEnvironment::new(Viewport::new(1024.0, 768.0)).with_helper(Size::new(280.0, 100.0));
    env.add("#a", NodeRect::new(10.0, 10.0, 100.0, 30.0));
    env.add("#b", NodeRect::new(10.0, 200.0, 100.0, 30.0));
    env.add("#far", NodeRect::new(10.0, 4000.0, 100.0, 30.0));
    env
}

fn tour(steps: Vec<Step<FakeNode>>) -> Tour<FakeEnvironment> {
    let options = TourOptions::default().with_scroll_duration(Duration::from_millis(100));
    Tour::new(page(), TourConfig::new(steps).options(options)).unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn each_run_opens_show_step_span() {
    let ((), handle) = with_captured_tracing(|| {
        let mut t = tour(vec![Step::targeting("#a"), Step::targeting("#b"), Step::targeting("#a")]);
        t.open().unwrap();
        t.next();
        t.go_to(2).unwrap();
        t.close();
    });

    let spans = handle.show_step_spans();
    assert_eq!(spans.len(), 3);
    let indices: Vec<&str> = spans.iter().map(|s| s.fields["index"].as_str()).collect();
    assert_eq!(indices, vec!["0", "1", "2"]);

    let generations: Vec<u64> = spans
        .iter()
        .map(|s| s.fields["generation"].parse().unwrap())
        .collect();
    assert!(generations.windows(2).all(|w| w[0] < w[1]), "{generations:?}");
}

#[test]
fn normal_operation_logs_no_errors_or_warnings() {
    let ((), handle) = with_captured_tracing(|| {
        let mut t = tour(vec![Step::targeting("#a"), Step::targeting("#missing"), Step::targeting("#far")]);
        t.open().unwrap();
        t.next();
        t.next();
        for _ in 0..10 {
            t.environment_mut().advance(Duration::from_millis(16));
            t.tick();
        }
        t.close();
    });

    let noisy: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.level <= tracing::Level::WARN)
        .collect();
    assert!(noisy.is_empty(), "unexpected warnings: {noisy:?}");
    assert!(handle.events().iter().any(|e| e.target == "guidepost.scroll"));
    assert!(handle.events().iter().any(|e| e.target == "guidepost.tour"));
}

#[test]
fn hook_failure_logs_warning() {
    let ((), handle) = with_captured_tracing(|| {
        let failing = Step::targeting("#b").before(Hook::sync(|_| Err(HookError::new("not ready"))));
        let mut t = tour(vec![Step::targeting("#a"), failing]);
        t.open().unwrap();
        t.next();
    });

    let warnings: Vec<CapturedEvent> = handle
        .events()
        .into_iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    let warning = &warnings[0];
    assert_eq!(warning.target, "guidepost.pipeline");
    assert_eq!(warning.fields.get("hook").map(String::as_str), Some("step.before"));
    assert_eq!(warning.fields.get("error").map(String::as_str), Some("not ready"));
    assert_eq!(warning.fields.get("index").map(String::as_str), Some("1"));
}

#[test]
fn superseded_scroll_is_logged() {
    let ((), handle) = with_captured_tracing(|| {
        let mut t = tour(vec![Step::targeting("#a"), Step::targeting("#far")]);
        t.open().unwrap();
        t.next();
        t.previous();
    });

    assert!(handle.events().iter().any(|e| {
        e.target == "guidepost.scroll"
            && e.fields.get("message").is_some_and(|m| m == "scroll cancelled")
    }));
    let spans = handle.show_step_spans();
    assert_eq!(spans.len(), 3);
}
