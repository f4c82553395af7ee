use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::{strip::Frame, sync::lock_recover};

use super::{pixels, AppState};

/// `GET /pixels`: a WebSocket upgrade streams frames, a plain request gets the JSON list
pub async fn pixels_or_socket(ws: Option<WebSocketUpgrade>, State(state): State<AppState>) -> Response {
    match ws {
        Some(ws) => ws.on_upgrade(move |socket| stream_pixels(socket, state)),
        None => pixels::get_pixels(State(state)).await.into_response(),
    }
}

fn frame_message(frame: &Frame) -> Message {
    let pixels: Vec<_> = frame
        .pixels()
        .iter()
        .enumerate()
        .map(|(i, [r, g, b])| json!({ "i": i, "r": r, "g": g, "b": b }))
        .collect();
    Message::Text(json!(pixels).to_string())
}

/// Send the current pixels, then every shown frame until the viewer leaves
async fn stream_pixels(mut socket: WebSocket, state: AppState) {
    // Subscribe before reading the current frame so no show is missed
    let (mut frames, current) = {
        let strip = lock_recover(&state.strip);
        (strip.subscribe(), strip.shown().clone())
    };
    debug!("Pixel viewer connected");

    if socket.send(frame_message(&current)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    if socket.send(frame_message(&frame)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Pixel viewer lagged, skipped {} frames", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("Pixel viewer disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_frame_message_format() {
        let message = frame_message(&Frame::new(vec![[1, 2, 3], [4, 5, 6]]));
        let Message::Text(text) = message else {
            panic!("expected a text message");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[1], json!({ "i": 1, "r": 4, "g": 5, "b": 6 }));
    }

    #[tokio::test]
    async fn test_plain_get_returns_pixel_list() {
        let state = crate::server::test_state(2);
        {
            let mut strip = lock_recover(&state.strip);
            strip.set(1, [4, 5, 6]);
            strip.show().unwrap();
        }

        let response = pixels_or_socket(None, State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value[1], json!({ "i": 1, "r": 4, "g": 5, "b": 6 }));
    }
}
