//! Log capture for unit tests.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One event seen by [`LogCapture`].
#[derive(Debug, Clone)]
pub(crate) struct CapturedEvent {
    pub level: Level,
    pub category: Option<String>,
    pub has_trace: bool,
}

#[derive(Default)]
struct EventFields {
    category: Option<String>,
    has_trace: bool,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "category" {
            self.category = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "category" => self.category = Some(format!("{value:?}").trim_matches('"').to_string()),
            "trace" => self.has_trace = true,
            _ => {}
        }
    }
}

/// Records every event emitted while [`LogCapture::run`] executes.
#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = EventFields::default();
        event.record(&mut fields);
        self.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            category: fields.category,
            has_trace: fields.has_trace,
        });
    }
}

impl LogCapture {
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// Events whose `category` field equals `category`.
    pub fn in_category(&self, category: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.category.as_deref() == Some(category))
            .collect()
    }
}
