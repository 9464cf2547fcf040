//! WebSocket subscription endpoint.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::StreamExt;
use tracing::debug;

use crate::state::AppState;

/// Handle the `/ws` upgrade request.
///
/// Origin checking is intentionally permissive: the server binds to a
/// loopback port and carries no credentials, and every subscriber receives
/// the same unfiltered stream.
pub async fn ws_upgrade(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Register the connection with the hub, then drain client frames until
/// the peer goes away.
///
/// Draining keeps the protocol's control frames (ping/pong/close) being
/// processed so disconnects are noticed promptly; the payloads themselves
/// are discarded — filtering is the browser's job.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sink, mut stream) = socket.split();
    let id = state.hub().register(sink).await;

    while let Some(received) = stream.next().await {
        match received {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    state.hub().deregister(id).await;
    debug!(subscriber = id, "websocket connection closed");
}
