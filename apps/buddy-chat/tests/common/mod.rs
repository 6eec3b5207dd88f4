#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::time;
use tokio_tungstenite::tungstenite;

use buddy_chat::config::Config;
use buddy_chat::AppState;

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Build a test config serving static files from `static_dir`.
pub fn test_config(static_dir: &Path) -> Config {
    Config {
        port: 0,
        static_dir: static_dir.to_path_buf(),
        ..Config::default()
    }
}

/// Build the full application router wired to a fresh hub.
pub fn test_app(config: Config) -> (Router, AppState) {
    let routes = buddy_chat::routes::router(&config);
    let state = AppState::new(config);
    (routes.with_state(state.clone()), state)
}

/// Start an actual TCP server for WebSocket testing. The server runs in the
/// background for the rest of the test.
pub async fn start_server() -> SocketAddr {
    let (app, _state) = test_app(test_config(Path::new("public")));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Open a gateway connection without joining.
pub async fn connect(addr: SocketAddr) -> WsStream {
    let url = format!("ws://{addr}/gateway");
    let (ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws
}

pub async fn send_json(ws: &mut WsStream, value: Value) {
    ws.send(tungstenite::Message::Text(value.to_string().into()))
        .await
        .expect("send frame");
}

/// Read the next JSON text frame, failing the test after 5 seconds.
pub async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream ended")
            .expect("ws read error");

        match msg {
            tungstenite::Message::Text(text) => {
                return serde_json::from_str(&text).expect("parse frame");
            }
            tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
            other => panic!("Expected text frame, got: {other:?}"),
        }
    }
}

/// Assert that nothing arrives within a short window.
pub async fn expect_silence(ws: &mut WsStream) {
    if let Ok(frame) = time::timeout(Duration::from_millis(200), ws.next()).await {
        panic!("Expected no frame, got: {frame:?}");
    }
}

/// Connect, send `join`, and read frames up to and including the roster that
/// completes the join. Returns the socket and every frame read.
pub async fn join(addr: SocketAddr, user: &str, email: &str) -> (WsStream, Vec<Value>) {
    let mut ws = connect(addr).await;
    send_json(
        &mut ws,
        serde_json::json!({ "type": "join", "user": user, "email": email }),
    )
    .await;

    let mut frames = Vec::new();
    loop {
        let frame = next_json(&mut ws).await;
        let done = frame["type"] == "participants";
        frames.push(frame);
        if done {
            return (ws, frames);
        }
    }
}
