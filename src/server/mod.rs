//! # Server
//!
//! HTTP and WebSocket surface. The pixel routes keep the wire format that
//! existing strip clients speak; the engine routes expose the operation API,
//! control bindings and recordings.

pub mod control;
pub mod pixels;
pub mod ws;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    animation::SharedEngine,
    color::ColorSpaceRegistry,
    config::ServerConfig,
    error::{ColorError, LightsError, OperationError, PlaybackError, Result},
    input::{ActivityMonitor, ControlBindings, InputEvent},
    strip::SharedStrip,
};

/// Everything the handlers share
#[derive(Clone)]
pub struct AppState {
    pub strip: SharedStrip,
    pub engine: SharedEngine,
    pub bindings: Arc<Mutex<ControlBindings>>,
    pub monitor: ActivityMonitor,
    pub events: mpsc::Sender<InputEvent>,
    pub spaces: Arc<ColorSpaceRegistry>,
    pub recordings_dir: PathBuf,
}

/// Library error turned into an HTTP response
pub struct ApiError(LightsError);

impl<E: Into<LightsError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LightsError::Color(ColorError::UnknownName { .. }) => StatusCode::NOT_FOUND,
            LightsError::Operation(OperationError::UnknownControl { .. }) => StatusCode::NOT_FOUND,
            LightsError::Operation(_) => StatusCode::BAD_REQUEST,
            LightsError::Playback(PlaybackError::Empty) => StatusCode::NOT_FOUND,
            LightsError::Playback(_) | LightsError::Image(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build the full router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/pixel/:index", get(pixels::get_pixel).post(pixels::set_pixel))
        .route(
            "/pixel/:index/:channels",
            get(pixels::get_pixel_channels).post(pixels::set_pixel_channels),
        )
        .route("/pixels", get(ws::pixels_or_socket).post(pixels::set_pixels))
        .route(
            "/pixels/:channels",
            get(pixels::get_pixels_channels).post(pixels::set_pixels_channels),
        )
        .route("/color/:name", post(pixels::color_all))
        .route("/color/:index/:name", post(pixels::color_one))
        .route("/pattern", post(pixels::pattern_from_body))
        .route("/pattern/:name", post(pixels::pattern_named))
        .route("/op", post(pixels::op_from_body))
        .route("/op/:name", post(pixels::op_named))
        .route("/op/:name/:count", post(pixels::op_counted))
        .route("/op/:name/:count/:delay", post(pixels::op_timed))
        .route("/colorspace", get(pixels::list_colorspaces).post(pixels::select_colorspace))
        .route("/engine", get(control::engine_status))
        .route("/engine/discrete", post(control::engine_discrete))
        .route("/engine/continuous", post(control::engine_continuous))
        .route("/controls", get(control::list_controls))
        .route(
            "/controls/:control",
            post(control::drive_control).put(control::rebind_control),
        )
        .route("/playback", get(control::download_playback).post(control::upload_playback))
        .route("/playback/save", post(control::save_playback))
        .with_state(state)
}

/// Handler state over a strip with no hardware attached
#[cfg(test)]
pub(crate) fn test_state(pixel_count: usize) -> AppState {
    use crate::{animation::Engine, config::Config, output::NullSink, strip::Strip};
    use tokio::sync::broadcast;

    let mut config = Config::default();
    config.strip.pixel_count = pixel_count;
    let (frames, _) = broadcast::channel(config.server.frame_channel_capacity);
    let (events, _) = mpsc::channel(config.server.event_queue_capacity);

    AppState {
        strip: Strip::new(pixel_count, Box::new(NullSink::new()), frames).into_shared(),
        engine: Engine::from_config(&config).into_shared(),
        bindings: Arc::new(Mutex::new(ControlBindings::new(config.controls))),
        monitor: ActivityMonitor::new(),
        events,
        spaces: Arc::new(ColorSpaceRegistry::new()),
        recordings_dir: PathBuf::from("recordings"),
    }
}

/// Serve until ctrl-c
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let address = config.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Service at http://{}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
