use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{error, info};

use crate::{
    config::DisplayConfig,
    services::{
        display::{DisplaySession, ZoneCounts},
        metrics::DISPLAY_SESSIONS_GAUGE,
    },
    AppState,
};

/// GET /ws/display?announcements=N&athletics=N&gallery=N&ticker=N
pub async fn display_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(counts): Query<ZoneCounts>,
) -> Response {
    let display = state.config.display;
    ws.on_upgrade(move |socket| handle_socket(socket, counts.capped(), display))
}

async fn handle_socket(socket: WebSocket, counts: ZoneCounts, display: DisplayConfig) {
    let session = match DisplaySession::start(counts, &display) {
        Ok(session) => session,
        Err(e) => {
            error!("Display session failed to start: {}", e);
            return;
        }
    };
    info!("Display connected: zones={:?}", session.zones());
    DISPLAY_SESSIONS_GAUGE.inc();

    let (mut sender, mut receiver) = socket.split();

    // Rotator and clock frames → WebSocket
    let mut frames = session.frames();
    let mut frame_task = tokio::spawn(async move {
        while let Some(frame) = frames.next().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode display frame: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // The kiosk never sends anything meaningful; watch for the close.
    let mut client_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut frame_task) => client_task.abort(),
        _ = (&mut client_task) => frame_task.abort(),
    }

    session.stop();
    DISPLAY_SESSIONS_GAUGE.dec();
    info!("Display disconnected");
}
