//! WebSocket connections for live reload.
//!
//! Each connection registers itself with the [`ClientRegistry`], forwards
//! queued signals to the browser and unregisters when the socket closes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;

use super::registry::ClientRegistry;

/// Complete the handshake and hand the socket to the registry.
pub(crate) fn upgrade(ws: WebSocketUpgrade, registry: Arc<ClientRegistry>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// Handle an established WebSocket connection.
pub(crate) async fn handle_socket(mut socket: WebSocket, registry: Arc<ClientRegistry>) {
    let (id, mut signals) = registry.register();
    tracing::debug!(client = %id, clients = registry.len(), "Live reload client connected");

    loop {
        tokio::select! {
            // Forward signals to the browser
            signal = signals.recv() => {
                let Some(signal) = signal else { break };
                if socket.send(Message::Text(signal.as_str().into())).await.is_err() {
                    break;
                }
            }
            // Clients have nothing to say; just log it
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        tracing::info!(
                            client = %id,
                            message = %text.as_str(),
                            "Live reload client message"
                        );
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        tracing::info!(
                            client = %id,
                            len = bytes.len(),
                            "Live reload client binary message"
                        );
                    }
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    registry.unregister(id);
    tracing::debug!(client = %id, clients = registry.len(), "Live reload client disconnected");
}
