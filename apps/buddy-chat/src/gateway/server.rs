//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};

use crate::AppState;

use super::hub::HubHandle;
use super::session::ConnectionHandle;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state.hub))
}

/// Pump one socket: inbound text frames go to the hub, frames the hub queues
/// for this connection go out. Runs until either side goes away, then reports
/// the close to the hub.
async fn handle_connection(socket: WebSocket, hub: HubHandle) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (handle, mut outbound) = ConnectionHandle::open();
    let conn_id = handle.id().clone();

    if !hub.connect(handle) {
        let _ = ws_tx.close().await;
        return;
    }

    tracing::info!(%conn_id, "gateway connection opened");

    loop {
        tokio::select! {
            // Client sends us a message.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        hub.frame(&conn_id, text.as_str().to_owned());
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, %conn_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Frame queued by the hub for this connection.
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    // The hub dropped every handle to us.
                    break;
                };
                if let Err(e) = ws_tx.send(Message::Text(frame.to_string().into())).await {
                    tracing::debug!(?e, %conn_id, "ws write error");
                    break;
                }
            }
        }
    }

    // Dropping the receiver marks the handle closed for any fanout that runs
    // before the hub processes the close.
    drop(outbound);
    hub.closed(&conn_id);

    tracing::info!(%conn_id, "gateway connection closed");
}
