//! Captures what tests need from tracing output: event counts by their
//! `event` field and the fields of named spans.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;

struct EventCounter {
    name: &'static str,
    hits: Arc<AtomicUsize>,
}

struct EventName<'a> {
    want: &'a str,
    hit: bool,
}

impl Visit for EventName<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "event" && value == self.want {
            self.hit = true;
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S: Subscriber> Layer<S> for EventCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventName {
            want: self.name,
            hit: false,
        };
        event.record(&mut visitor);
        if visitor.hit {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` on this thread and count events logged with `event = name`.
pub fn count_events<R>(name: &'static str, f: impl FnOnce() -> R) -> (R, usize) {
    let hits = Arc::new(AtomicUsize::new(0));
    let subscriber = Registry::default().with(EventCounter {
        name,
        hits: Arc::clone(&hits),
    });
    let out = tracing::subscriber::with_default(subscriber, f);
    let count = hits.load(Ordering::SeqCst);
    (out, count)
}

struct SpanFields {
    span: &'static str,
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

struct FieldList(Vec<(String, String)>);

impl Visit for FieldList {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
}

impl<S: Subscriber> Layer<S> for SpanFields {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        if attrs.metadata().name() != self.span {
            return;
        }
        let mut fields = FieldList(Vec::new());
        attrs.record(&mut fields);
        if let Ok(mut seen) = self.seen.lock() {
            seen.extend(fields.0);
        }
    }
}

/// Run `f` on this thread and collect `(field, value)` pairs of every span
/// named `span` it opens.
pub fn span_fields<R>(span: &'static str, f: impl FnOnce() -> R) -> (R, Vec<(String, String)>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Registry::default().with(SpanFields {
        span,
        seen: Arc::clone(&seen),
    });
    let out = tracing::subscriber::with_default(subscriber, f);
    let fields = seen.lock().map(|s| s.clone()).unwrap_or_default();
    (out, fields)
}
