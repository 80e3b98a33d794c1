#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! Solver spans and the `TracingObserver`:
//!   cargo test -p cellfit-layout --features tracing --test tracing_observer
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p cellfit-layout --test tracing_observer -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cellfit_layout::{SizeSpec, allocate};
#[cfg(feature = "tracing")]
use cellfit_layout::{CellMeasure, Extent, Rect, TableLayout, TracingObserver, allocate_with};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A span or event seen by the capture layer.
#[derive(Debug, Clone)]
struct Captured {
    name: String,
    level: tracing::Level,
    fields: HashMap<String, String>,
}

#[derive(Default)]
struct Records {
    spans: Vec<Captured>,
    events: Vec<Captured>,
}

struct Capture {
    records: Arc<Mutex<Records>>,
}

struct CaptureHandle {
    records: Arc<Mutex<Records>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<Captured> {
        self.records.lock().unwrap().spans.clone()
    }

    fn events(&self) -> Vec<Captured> {
        self.records.lock().unwrap().events.clone()
    }

    fn events_at(&self, level: tracing::Level) -> Vec<Captured> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }
}

struct FieldVisitor(HashMap<String, String>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(HashMap::new());
        attrs.record(&mut visitor);
        self.records.lock().unwrap().spans.push(Captured {
            name: attrs.metadata().name().to_string(),
            level: *attrs.metadata().level(),
            fields: visitor.0,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(HashMap::new());
        event.record(&mut visitor);
        self.records.lock().unwrap().events.push(Captured {
            name: event.metadata().name().to_string(),
            level: *event.metadata().level(),
            fields: visitor.0,
        });
    }
}

fn with_capture<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let records = Arc::new(Mutex::new(Records::default()));
    let layer = Capture {
        records: records.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { records }
}

/// Exact cells cannot grow, so 50 of the 100 pixels stay unassigned.
fn rigid() -> Vec<SizeSpec> {
    vec![SizeSpec::exact(30), SizeSpec::exact(20)]
}

// ============================================================================
// Feature enabled
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn allocate_opens_a_span_per_call() {
    let handle = with_capture(|| {
        let mut specs = vec![SizeSpec::exact(10), SizeSpec::relative(1.0)];
        allocate(&mut specs, 40);
        allocate(&mut specs, 60);
    });

    let spans: Vec<_> = handle
        .spans()
        .into_iter()
        .filter(|span| span.name == "allocate")
        .collect();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].fields.get("cells").map(String::as_str), Some("2"));
    assert_eq!(spans[1].fields.get("container").map(String::as_str), Some("60"));
}

#[test]
#[cfg(feature = "tracing")]
fn unresolved_space_warns() {
    let handle = with_capture(|| {
        let mut specs = rigid();
        allocate(&mut specs, 100);
    });

    let warnings = handle.events_at(tracing::Level::WARN);
    assert_eq!(warnings.len(), 1, "warnings: {warnings:?}");
    assert_eq!(
        warnings[0].fields.get("residual").map(String::as_str),
        Some("-50")
    );
}

#[test]
#[cfg(feature = "tracing")]
fn resolved_allocation_does_not_warn() {
    let handle = with_capture(|| {
        let mut specs = vec![SizeSpec::exact(10), SizeSpec::relative(1.0).with_preferred(5.0)];
        allocate(&mut specs, 90);
    });
    assert!(handle.events_at(tracing::Level::WARN).is_empty());
    assert!(
        handle
            .events()
            .iter()
            .any(|event| event.fields.get("message").is_some_and(|m| m.contains("finished")))
    );
}

#[test]
#[cfg(feature = "tracing")]
fn tracing_observer_forwards_branch_and_unresolved() {
    let handle = with_capture(|| {
        let mut specs = rigid();
        allocate_with(&mut specs, 100, &mut TracingObserver);
    });

    let branch_events: Vec<_> = handle
        .events_at(tracing::Level::DEBUG)
        .into_iter()
        .filter(|event| {
            event
                .fields
                .get("message")
                .is_some_and(|m| m == "allocation branch")
        })
        .collect();
    assert!(
        branch_events
            .iter()
            .any(|event| event.fields.get("branch").is_some_and(|b| b.contains("Stretch"))),
        "branch events: {branch_events:?}"
    );
    // One warning from the solver itself, one forwarded by the observer.
    assert_eq!(handle.events_at(tracing::Level::WARN).len(), 2);
}

#[test]
#[cfg(feature = "tracing")]
fn table_solve_nests_measure_and_allocate() {
    let handle = with_capture(|| {
        let table = TableLayout::new(
            [SizeSpec::preferred(), SizeSpec::relative(1.0)],
            [SizeSpec::preferred()],
        );
        let components = [CellMeasure::new(0, 0, Extent::new(30, 8), Extent::new(10, 4))];
        let _ = table.solve(&components, Rect::new(0, 0, 100, 20));
    });

    let names: Vec<String> = handle.spans().into_iter().map(|span| span.name).collect();
    assert!(names.iter().any(|name| name == "measure_tracks"), "spans: {names:?}");
    assert_eq!(names.iter().filter(|name| *name == "allocate").count(), 2);
    assert!(handle.spans().iter().all(|span| span.level == tracing::Level::DEBUG));
}

// ============================================================================
// Feature disabled
// ============================================================================

#[test]
#[cfg(not(feature = "tracing"))]
fn zero_overhead_without_feature() {
    let handle = with_capture(|| {
        let mut specs = rigid();
        allocate(&mut specs, 100);
    });
    assert!(handle.spans().is_empty());
    assert!(handle.events().is_empty());
}
