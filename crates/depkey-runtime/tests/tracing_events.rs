//! Structured logging emitted while defining, reading and writing computed
//! properties.

use std::sync::{Arc, Mutex};

use depkey_core::Handler;
use depkey_runtime::Object;
use serde_json::{Value, json};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Default)]
struct Captured {
    messages: Vec<String>,
}

struct ObjectTraceCapture {
    state: Arc<Mutex<Captured>>,
}

impl<S> Layer<S> for ObjectTraceCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Msg {
            message: Option<String>,
        }
        impl tracing::field::Visit for Msg {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_string());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                }
            }
        }
        let mut msg = Msg { message: None };
        event.record(&mut msg);
        if let Some(message) = msg.message {
            self.state
                .lock()
                .expect("object trace lock")
                .messages
                .push(message);
        }
    }
}

fn capture(run: impl FnOnce()) -> Vec<String> {
    let state = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry().with(ObjectTraceCapture {
        state: Arc::clone(&state),
    });
    tracing::subscriber::with_default(subscriber, run);
    let snapshot = state.lock().expect("object trace lock");
    snapshot.messages.clone()
}

#[test]
fn define_read_write_emit_events() {
    let messages = capture(|| {
        let obj = Object::from_json(json!({ "a": 1 })).unwrap();
        obj.define_with(
            "double",
            ["a"],
            Handler::getter(|_: &Object, deps: &[Value]| json!(deps[0].as_i64().unwrap_or(0) * 2)),
        )
        .unwrap();
        assert_eq!(obj.get("double"), json!(2));
        obj.set("a", 5).unwrap();
    });

    for expected in ["computed.define", "computed.recompute", "object.invalidate"] {
        assert!(
            messages.iter().any(|m| m == expected),
            "expected {expected} event, got {messages:?}"
        );
    }
}

#[test]
fn setter_and_override_are_logged() {
    let messages = capture(|| {
        let obj = Object::new();
        obj.define_with(
            "echo",
            Vec::<String>::new(),
            Handler::get_set().with_set(|_: &Object, value: Value, _: &[Value]| value),
        )
        .unwrap();
        obj.define_with(
            "fixed",
            Vec::<String>::new(),
            Handler::getter(|_: &Object, _: &[Value]| Value::Null),
        )
        .unwrap();
        obj.set("echo", 1).unwrap();
        obj.set("fixed", 2).unwrap();
    });

    assert!(messages.iter().any(|m| m == "computed.set"), "{messages:?}");
    assert!(messages.iter().any(|m| m == "computed.override"), "{messages:?}");
}

#[cfg(feature = "tracing")]
#[test]
fn core_build_event_is_forwarded() {
    let messages = capture(|| {
        let obj = Object::new();
        obj.define_with(
            "k",
            ["a.{b,c}"],
            Handler::getter(|_: &Object, deps: &[Value]| Value::Array(deps.to_vec())),
        )
        .unwrap();
        let _ = obj.get("k");
    });

    assert!(messages.iter().any(|m| m == "computed.build"), "{messages:?}");
    assert!(messages.iter().any(|m| m == "computed.get"), "{messages:?}");
}
