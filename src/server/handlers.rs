use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::error;
use wayfarer_event_bus::{AgentEvent, EventBus};
use wayfarer_kernel::{model_catalogue, HealthSnapshot, KernelError, StartRequest};

use super::state::ServeState;

/// Body of `POST /start`: field names mirror the operator UI's
/// camelCase wire format.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBody {
    pub url: String,
    #[serde(default = "default_persona_name")]
    pub persona_name: String,
    pub objective: String,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub tts_enabled: bool,
    #[serde(default = "default_true")]
    pub headless_mode: bool,
    #[serde(default)]
    pub save_trace: bool,
    #[serde(default)]
    pub save_thoughts: bool,
    #[serde(default)]
    pub save_screenshots: bool,
}

fn default_persona_name() -> String {
    "Wayfarer".to_string()
}

fn default_model_name() -> String {
    "vision-1".to_string()
}

fn default_true() -> bool {
    true
}

pub async fn start_handler(State(state): State<ServeState>, Json(body): Json<StartBody>) -> impl IntoResponse {
    let request = StartRequest {
        target_url: body.url,
        persona_name: body.persona_name,
        mission: body.objective,
        debug_marks: body.debug_mode,
        model_id: body.model_name,
        voice_tts: body.tts_enabled,
        headless: body.headless_mode,
        save_trace: body.save_trace,
        save_thoughts: body.save_thoughts,
        save_screenshots: body.save_screenshots,
        monkey_mode: false,
        bare_mode: false,
    };

    match state.controller.begin(request).await {
        Ok(handle) => (StatusCode::OK, Json(json!({ "runId": handle.run_id }))).into_response(),
        Err(err) => kernel_error_response(err),
    }
}

pub async fn stop_handler(State(state): State<ServeState>) -> impl IntoResponse {
    match state.controller.stop() {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "stopped" }))).into_response(),
        Err(err) => kernel_error_response(err),
    }
}

pub async fn models_handler() -> impl IntoResponse {
    Json(model_catalogue())
}

#[derive(Deserialize)]
pub struct TtsDoneBody {
    pub id: String,
}

pub async fn tts_done_handler(State(state): State<ServeState>, Json(body): Json<TtsDoneBody>) -> impl IntoResponse {
    let acked = state.controller.ack_speech(&body.id);
    Json(json!({ "acked": acked }))
}

#[derive(Deserialize)]
pub struct TtsToggleBody {
    pub enabled: bool,
}

pub async fn tts_toggle_handler(
    State(state): State<ServeState>,
    Json(body): Json<TtsToggleBody>,
) -> impl IntoResponse {
    state.controller.tts_toggle(body.enabled);
    Json(json!({ "enabled": body.enabled }))
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    active: bool,
}

pub async fn health_handler(State(state): State<ServeState>) -> impl IntoResponse {
    Json(HealthBody { status: "ok", active: state.controller.is_active() })
}

pub async fn live_handler(State(state): State<ServeState>) -> impl IntoResponse {
    let snapshot = state.controller.health_snapshot();
    let status = if snapshot.live { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(json!({ "live": snapshot.live, "ready": snapshot.ready })))
}

pub async fn ready_handler(State(state): State<ServeState>) -> impl IntoResponse {
    let snapshot = state.controller.health_snapshot();
    let status = if snapshot.ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(ready_body(&snapshot)))
}

fn ready_body(snapshot: &HealthSnapshot) -> Value {
    json!({
        "ready": snapshot.ready,
        "active": snapshot.active,
        "lastReadyCheckTs": snapshot.last_ready_check,
        "lastError": snapshot.last_error,
    })
}

/// `GET /events` ("Event stream"): every [`AgentEvent`] published on
/// the Run's bus, reduced to `{event, data}` SSE frames the operator UI
/// switches on by `event.type`.
pub async fn events_sse_handler(
    State(state): State<ServeState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.controller.bus().subscribe();

    let stream = stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => yield Ok(sse_event(&event)),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("keep-alive"))
}

fn sse_event(event: &AgentEvent) -> Event {
    let (kind, payload): (&'static str, Value) = match event {
        AgentEvent::Status { run_id, status } => {
            ("status", json!({ "runId": run_id, "status": status.label() }))
        }
        AgentEvent::Thought { run_id, message } => ("thought", json!({ "runId": run_id, "message": message })),
        AgentEvent::Step { run_id, id, action, target_id, value, thought } => (
            "step",
            json!({
                "runId": run_id,
                "id": id,
                "action": action,
                "targetId": target_id,
                "value": value,
                "thought": thought,
            }),
        ),
        AgentEvent::Screenshot { run_id, data_url } => {
            ("screenshot", json!({ "runId": run_id, "dataUrl": data_url }))
        }
        AgentEvent::Cursor { run_id, x, y, viewport_width, viewport_height } => (
            "cursor",
            json!({
                "runId": run_id,
                "x": x,
                "y": y,
                "viewportWidth": viewport_width,
                "viewportHeight": viewport_height,
            }),
        ),
        AgentEvent::Tts { run_id, id, text, mime, audio_base64 } => (
            "tts",
            json!({ "runId": run_id, "id": id, "text": text, "mime": mime, "audioBase64": audio_base64 }),
        ),
        AgentEvent::TraceSaved { run_id, path, download_url } => (
            "trace_saved",
            json!({ "runId": run_id, "path": path, "downloadUrl": download_url }),
        ),
        AgentEvent::ReportReady { run_id, path, download_url } => (
            "report_ready",
            json!({ "runId": run_id, "path": path, "downloadUrl": download_url }),
        ),
        AgentEvent::Error { run_id, message } => ("error", json!({ "runId": run_id, "message": message })),
    };

    Event::default().event(kind).json_data(payload).unwrap_or_else(|err| {
        error!(error = %err, "failed to encode agent event as SSE data");
        Event::default().event("error").data("{}")
    })
}

fn kernel_error_response(err: KernelError) -> axum::response::Response {
    let status = match err {
        KernelError::MissingUrl => StatusCode::BAD_REQUEST,
        KernelError::AlreadyActive | KernelError::NotActive => StatusCode::CONFLICT,
        KernelError::BrowserLaunch(_) | KernelError::Artifacts(_) | KernelError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
