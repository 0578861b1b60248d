use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
};
use bustrack_core::config::MAX_PAYLOAD_BYTES;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::debug;

use crate::app::AppState;
use crate::ws::{message, outbound, send};

/// Upgrades HTTP to WebSocket at GET /ws.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.max_message_size(MAX_PAYLOAD_BYTES)
        .on_upgrade(|socket| run_connection(socket, state))
}

/// Per-connection event loop, alive for the whole WS session.
///
/// Inbound frames and this connection's broadcast queue are serviced from
/// one task, so frames are handled strictly in arrival order. Teardown runs
/// exactly once when the loop exits, whatever the reason.
async fn run_connection(socket: WebSocket, state: Arc<AppState>) {
    let (mut conn, mut events) = state.lifecycle.connect();
    let (mut tx, mut rx) = socket.split();

    loop {
        tokio::select! {
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if message::handle(&mut conn, text.as_str(), &mut tx, &mut events, &state)
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = tx.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(conn_id = %conn.id(), error = %e, "transport error");
                        break;
                    }
                    _ => {}
                }
            }

            event = events.recv() => {
                let Some(event) = event else { break };
                let frame = outbound::broadcast_frame(&event).with_seq(state.next_seq());
                if send::json(&mut tx, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    state.lifecycle.disconnect(conn);
}
