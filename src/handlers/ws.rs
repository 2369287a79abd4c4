//! `/ws/tracks` and `/ws/cot` streaming endpoints (C11, spec.md §6).
//!
//! Pattern grounded in the Regatta Suite's UWB simulator control socket:
//! `WebSocketUpgrade` → `on_upgrade` → a `tokio::select!` loop relaying a
//! channel while watching for client disconnect.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;

use crate::core::cot::to_cursor_on_target;
use crate::gateway::tagged;
use crate::models::event::EventType;
use crate::models::track::Track;
use crate::AppState;

pub async fn ws_tracks(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_tracks(socket, state))
}

async fn handle_tracks(mut socket: WebSocket, state: AppState) {
    let snapshot = match state.gateway.tracks_snapshot() {
        Ok(frames) => frames,
        Err(err) => {
            tracing::error!(%err, "failed to build tracks snapshot");
            return;
        }
    };
    for frame in snapshot {
        if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
            return;
        }
    }

    let (sub_id, mut rx) = state.gateway.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        let frame = tagged(&event);
                        if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }

    state.gateway.unsubscribe(sub_id);
}

pub async fn ws_cot(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_cot(socket, state))
}

async fn handle_cot(mut socket: WebSocket, state: AppState) {
    let snapshot = match state.gateway.cot_snapshot() {
        Ok(frames) => frames,
        Err(err) => {
            tracing::error!(%err, "failed to build cot snapshot");
            return;
        }
    };
    for frame in snapshot {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }

    let (sub_id, mut rx) = state.gateway.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(event) if matches!(event.event_type, EventType::Track) => {
                        let track: Result<Track, _> = serde_json::from_value(event.data);
                        if let Ok(track) = track {
                            let xml = to_cursor_on_target(&track);
                            if socket.send(Message::Text(xml.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }

    state.gateway.unsubscribe(sub_id);
}
