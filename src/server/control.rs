//! Engine, control-binding and recording routes.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{
    animation::{playback, EngineStatus},
    error::{LightsError, OperationError},
    input::{ControlBindings, ControlKind, InputEvent, InputValue},
    sync::lock_recover,
};

use super::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct DiscreteRequest {
    pub control: String,
    pub op: String,
    pub on: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContinuousRequest {
    pub control: String,
    pub op: String,
    pub value: f32,
}

/// Body of `POST /controls/{control}`: a press state, an analog value, or
/// an unprocessed controller reading that the binding interprets
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ControlState {
    Pressed { on: bool },
    Value { value: f32 },
    Raw { raw: f32 },
}

impl ControlState {
    fn event(self, bindings: &ControlBindings, control: &str) -> Option<InputEvent> {
        match self {
            Self::Pressed { on } => bindings.event(control, InputValue::Pressed(on)),
            Self::Value { value } => bindings.event(control, InputValue::Value(value)),
            Self::Raw { raw } => bindings.raw_event(control, raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RebindRequest {
    pub op: String,
}

/// One row of `GET /controls`
#[derive(Debug, Serialize)]
pub struct ControlView {
    pub control: String,
    pub kind: ControlKind,
    pub op: String,
    pub active: bool,
    /// Operations this control can be rebound to
    pub choices: Vec<&'static str>,
}

pub async fn engine_status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(lock_recover(&state.engine).status())
}

pub async fn engine_discrete(
    State(state): State<AppState>,
    Json(request): Json<DiscreteRequest>,
) -> Json<Value> {
    let applied = lock_recover(&state.engine).apply_discrete(&request.control, &request.op, request.on);
    Json(json!({ "applied": applied }))
}

pub async fn engine_continuous(
    State(state): State<AppState>,
    Json(request): Json<ContinuousRequest>,
) -> Json<Value> {
    let applied =
        lock_recover(&state.engine).apply_continuous(&request.control, &request.op, request.value);
    Json(json!({ "applied": applied }))
}

pub async fn list_controls(State(state): State<AppState>) -> Json<Vec<ControlView>> {
    let active = state.monitor.snapshot();
    let bindings = lock_recover(&state.bindings);
    let controls = bindings
        .iter()
        .map(|(control, binding)| ControlView {
            control: control.clone(),
            kind: binding.kind,
            op: binding.op.clone(),
            active: active.get(control).copied().unwrap_or(false),
            choices: binding.kind.catalog(),
        })
        .collect();
    Json(controls)
}

/// Feed a control state through its binding, as a physical input would
pub async fn drive_control(
    State(state): State<AppState>,
    Path(control): Path<String>,
    Json(body): Json<ControlState>,
) -> ApiResult<Json<Value>> {
    let bindings = lock_recover(&state.bindings).clone();
    let event = body
        .event(&bindings, &control)
        .ok_or_else(|| OperationError::UnknownControl { control: control.clone() })?;

    if state.events.try_send(event.clone()).is_err() {
        debug!("Input event queue full, dropping display update for {}", control);
    }

    let applied = bindings.dispatch(&mut lock_recover(&state.engine), &event);
    Ok(Json(json!({ "applied": applied })))
}

pub async fn rebind_control(
    State(state): State<AppState>,
    Path(control): Path<String>,
    Json(request): Json<RebindRequest>,
) -> ApiResult<Json<Value>> {
    let mut bindings = lock_recover(&state.bindings);
    let binding = bindings.rebind(&control, &request.op)?;
    Ok(Json(json!({ "control": control, "kind": binding.kind, "op": binding.op })))
}

pub async fn download_playback(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let png = lock_recover(&state.engine).recording_png()?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

pub async fn upload_playback(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let pixel_count = lock_recover(&state.engine).pixel_count();
    let frames = tokio::task::spawn_blocking(move || playback::decode_image(&body, pixel_count))
        .await
        .map_err(|e| LightsError::generic(format!("Image decode task failed: {}", e)))??;

    let count = frames.len();
    lock_recover(&state.engine).play_recording(frames)?;
    Ok(Json(json!({ "frames": count })))
}

pub async fn save_playback(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let frames = lock_recover(&state.engine).playback().frames().to_vec();
    let dir = state.recordings_dir.clone();

    let path = tokio::task::spawn_blocking(move || playback::save_timestamped(dir, &frames))
        .await
        .map_err(|e| LightsError::generic(format!("Save task failed: {}", e)))??;
    info!("Saved recording to {}", path.display());

    Ok(Json(json!({ "path": path.display().to_string() })))
}
