use std::{collections::VecDeque, sync::Arc};

use tokio::sync::broadcast;

/// Entries kept for clients that connect to `/api/logs` late.
pub(crate) const RING_CAPACITY: usize = 500;

pub(crate) type LogRing = Arc<std::sync::Mutex<VecDeque<String>>>;

/// Mirrors every event as a JSON line into a bounded ring and a broadcast
/// channel, for the log stream endpoint.
pub(crate) struct BroadcastLayer {
    pub tx: broadcast::Sender<String>,
    pub ring: LogRing,
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    case_id: Option<String>,
}

impl EventVisitor {
    fn put(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = value,
            "case_id" => self.case_id = Some(value),
            _ => {},
        }
    }
}

impl tracing::field::Visit for EventVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.put(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let mut text = format!("{value:?}");
        // Debug on &str adds quotes
        if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            text = text[1..text.len() - 1].to_string();
        }
        self.put(field.name(), text);
    }
}

pub(crate) fn category(target: &str) -> &'static str {
    if target.starts_with("judge_agent") {
        "gateway"
    } else if target.contains("controller") {
        "controller"
    } else if target.starts_with("tower_http") {
        "http"
    } else {
        "system"
    }
}

impl BroadcastLayer {
    pub fn new(tx: broadcast::Sender<String>, ring: LogRing) -> Self {
        Self { tx, ring }
    }

    fn publish(&self, line: String) {
        let _ = self.tx.send(line.clone());
        if let Ok(mut ring) = self.ring.lock() {
            ring.push_back(line);
            while ring.len() > RING_CAPACITY {
                ring.pop_front();
            }
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for BroadcastLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let level = match *event.metadata().level() {
            tracing::Level::ERROR => "err",
            tracing::Level::WARN => "warn",
            tracing::Level::INFO => "info",
            tracing::Level::DEBUG => "debug",
            tracing::Level::TRACE => return,
        };

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let mut line = serde_json::json!({
            "ts": chrono::Utc::now().timestamp(),
            "level": level,
            "message": visitor.message,
            "category": category(event.metadata().target()),
        });
        if let Some(case_id) = visitor.case_id {
            line["case_id"] = serde_json::Value::String(case_id);
        }
        self.publish(line.to_string());
    }
}
