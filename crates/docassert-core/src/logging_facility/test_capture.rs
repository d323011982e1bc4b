//! In-memory event capture for tests
//!
//! Installs a layer that records every event with its fields, and exposes
//! typed views of the fields the assertion operations emit (`diff_count`,
//! `format`, `side`, `path`, `err_code`). The capture is process-global, so
//! tests that share a binary should filter by an op name or marker value
//! only they produce.

use docassert_core_types::schema::{
    FIELD_DIFF_COUNT, FIELD_ERR_CODE, FIELD_EVENT, FIELD_FORMAT, FIELD_INPUT_LEN, FIELD_OP,
    FIELD_PATH, FIELD_SIDE,
};
use docassert_core_types::{DocumentFormat, DocumentSide};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    /// Raw value of a field, as recorded
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }

    pub fn diff_count(&self) -> Option<usize> {
        self.field(FIELD_DIFF_COUNT)?.parse().ok()
    }

    pub fn input_len(&self) -> Option<usize> {
        self.field(FIELD_INPUT_LEN)?.parse().ok()
    }

    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    pub fn path(&self) -> Option<&str> {
        self.field(FIELD_PATH)
    }

    /// Format named by the event's `format` label ("JSON", "XML", "CSV")
    pub fn format(&self) -> Option<DocumentFormat> {
        let label = self.field(FIELD_FORMAT)?;
        [DocumentFormat::Json, DocumentFormat::Xml, DocumentFormat::Csv]
            .into_iter()
            .find(|f| f.label() == label)
    }

    pub fn side(&self) -> Option<DocumentSide> {
        let name = self.field(FIELD_SIDE)?;
        [DocumentSide::Expected, DocumentSide::Actual]
            .into_iter()
            .find(|s| s.as_str() == name)
    }
}

/// Strings are kept unquoted; everything else through `Debug`, which renders
/// numbers and booleans as plain digits and words.
#[derive(Default)]
struct FieldRecorder(HashMap<String, String>);

impl Visit for FieldRecorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields: recorder.0,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Handle onto the shared event buffer.
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Snapshot of every event captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events of one operation and event type
    pub fn events_for(&self, op: &str, event: &str) -> Vec<CapturedEvent> {
        self.events().into_iter().filter(|e| e.is(op, event)).collect()
    }

    /// Events of one operation and event type that also satisfy `predicate`
    pub fn find<F>(&self, op: &str, event: &str, predicate: F) -> Vec<CapturedEvent>
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events_for(op, event).into_iter().filter(|e| predicate(e)).collect()
    }

    /// # Panics
    ///
    /// Panics if no event of `op` with type `event` was captured
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "no {} event for op {} among {} captured events",
            event,
            op,
            events.len()
        );
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber on first use and
/// return a handle to the shared buffer.
///
/// # Example
///
/// ```
/// use docassert_core::logging_facility::test_capture::init_test_capture;
/// use docassert_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("my_operation", input_len = 7);
/// capture.assert_event_exists("my_operation", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer {
                events: events.clone(),
            };
            let _ = tracing_subscriber::registry().with(layer).try_init();
            TestCapture { events }
        })
        .clone()
}
