use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use judge_core::{
    samples::{self, SAMPLES},
    GatewayError, ValidationIssue, VerdictRequest,
};
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::AppState;

pub(crate) fn router(state: Arc<AppState>, static_dir: &str) -> Router {
    let serve_dir =
        ServeDir::new(static_dir).fallback(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/verdict", post(post_verdict))
        .route("/api/samples", get(list_samples))
        .route("/api/samples/:name", get(get_sample))
        .route("/api/logs", get(sse_logs))
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Error helpers ─────────────────────────────────────────────────────────

fn invalid_input(issues: Vec<ValidationIssue>) -> Response {
    warn!(issues = issues.len(), "rejected invalid verdict request");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid input data", "details": issues })),
    )
        .into_response()
}

fn processing_error(e: &GatewayError) -> Response {
    error!("verdict request failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
        .into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_s": state.start_time.elapsed().as_secs(),
    }))
}

// Verdicts

pub(crate) async fn post_verdict(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return invalid_input(vec![ValidationIssue::new(
                "",
                format!("body is not valid JSON: {e}"),
            )])
        },
    };
    let request = match VerdictRequest::from_value(&value) {
        Ok(r) => r,
        Err(e) => return invalid_input(e.issues),
    };

    info!(
        case_id = %request.case_id(),
        kind = request.kind(),
        language = request.language().code(),
        "verdict requested"
    );

    match state.judge.request_verdict(&request).await {
        Ok(verdict) => Json(json!({ "verdict": verdict })).into_response(),
        Err(GatewayError::Invalid(e)) => invalid_input(e.issues),
        Err(e) => processing_error(&e),
    }
}

// Samples

pub(crate) async fn list_samples() -> Json<Value> {
    Json(json!(SAMPLES))
}

pub(crate) async fn get_sample(Path(name): Path<String>) -> Response {
    let (Some(info), Some(text)) = (samples::find(&name), samples::sample_text(&name)) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown sample: {name}") })),
        )
            .into_response();
    };
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", info.filename),
            ),
        ],
        text,
    )
        .into_response()
}

// ── /api/logs ──

/// Narrows the log stream to one category and/or one case. Unset fields
/// match every line.
#[derive(Debug, Default)]
pub(crate) struct LogFilter {
    category: Option<String>,
    case_id: Option<String>,
}

impl LogFilter {
    fn from_query(mut query: HashMap<String, String>) -> Self {
        Self {
            category: query.remove("category").filter(|c| !c.is_empty()),
            case_id: query.remove("case_id").filter(|c| !c.is_empty()),
        }
    }

    pub(crate) fn matches(&self, line: &str) -> bool {
        if self.category.is_none() && self.case_id.is_none() {
            return true;
        }
        let Ok(entry) = serde_json::from_str::<Value>(line) else {
            return false;
        };
        let field = |key: &str| entry.get(key).and_then(Value::as_str);
        self.category
            .as_deref()
            .map_or(true, |c| field("category") == Some(c))
            && self
                .case_id
                .as_deref()
                .map_or(true, |id| field("case_id") == Some(id))
    }
}

/// Replays the retained log lines, then follows live ones. Lines a slow
/// subscriber lagged past are skipped.
pub(crate) async fn sse_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = LogFilter::from_query(query);
    // Subscribe before reading the ring so no line falls in between
    let live = BroadcastStream::new(state.log_tx.subscribe()).filter_map(|line| line.ok());
    let history: Vec<String> = state
        .log_ring
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .cloned()
        .collect();

    let stream = tokio_stream::iter(history)
        .chain(live)
        .filter(move |line| filter.matches(line))
        .map(|line| Ok(Event::default().data(line)));
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
